use std::collections::BTreeMap;
use std::fmt;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Namespace name → metadata value for one match key.
pub type NamespaceValues = BTreeMap<String, String>;

/// Match key → namespace values, accumulated over every queried context.
pub type MetadataIndex = BTreeMap<String, NamespaceValues>;

/// Which namespace metadata map a match key is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataSource {
    Label,
    Annotation,
}

impl MetadataSource {
    /// Returns the label or annotation map of `meta`, if the namespace has one.
    pub fn values<'a>(&self, meta: &'a ObjectMeta) -> Option<&'a BTreeMap<String, String>> {
        match self {
            MetadataSource::Label => meta.labels.as_ref(),
            MetadataSource::Annotation => meta.annotations.as_ref(),
        }
    }
}

impl fmt::Display for MetadataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataSource::Label => f.write_str("label"),
            MetadataSource::Annotation => f.write_str("annotation"),
        }
    }
}
