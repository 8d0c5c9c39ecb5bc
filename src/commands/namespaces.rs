// Collect namespace labels/annotations across cluster contexts.
use std::collections::BTreeSet;

use k8s_openapi::api::core::v1::Namespace;
use kube::api::{Api, ListParams};
use kube::config::Kubeconfig;
use kube::Client;

use crate::commands::kubeconfig::client_for_context;
use crate::error::{Error, Result};
use crate::models::{MetadataIndex, MetadataSource};

/// Lists every namespace visible through `client`.
pub async fn list_namespaces(client: &Client, context: &str) -> Result<Vec<Namespace>> {
    let api: Api<Namespace> = Api::all(client.clone());
    let list = api
        .list(&ListParams::default())
        .await
        .map_err(|e| Error::Cluster {
            context: context.to_string(),
            message: format!("listing namespaces: {e}"),
        })?;
    Ok(list.items)
}

/// For each key in `keys`, maps namespace name → value of that label or
/// annotation. Namespaces without the key are left out; keys no namespace
/// carries have no entry.
pub fn extract_metadata(
    namespaces: &[Namespace],
    source: MetadataSource,
    keys: &BTreeSet<String>,
) -> MetadataIndex {
    let mut index = MetadataIndex::new();

    for ns in namespaces {
        let Some(name) = ns.metadata.name.as_ref() else {
            continue;
        };
        let Some(values) = source.values(&ns.metadata) else {
            continue;
        };

        for key in keys {
            if let Some(value) = values.get(key) {
                index
                    .entry(key.clone())
                    .or_default()
                    .insert(name.clone(), value.clone());
            }
        }
    }

    index
}

/// Adds `next` to `acc`. Namespace names present in both are taken from `next`.
pub fn merge_index(mut acc: MetadataIndex, next: MetadataIndex) -> MetadataIndex {
    for (key, values) in next {
        acc.entry(key).or_default().extend(values);
    }
    acc
}

/// Queries `contexts` in order and merges their metadata into one index.
/// Any context that cannot be reached aborts the collection.
pub async fn collect(
    kubeconfig: &Kubeconfig,
    contexts: &[String],
    source: MetadataSource,
    keys: &BTreeSet<String>,
) -> Result<MetadataIndex> {
    let mut index = MetadataIndex::new();

    for context in contexts {
        log::info!("namespaces: processing context '{context}'");
        let client = client_for_context(kubeconfig, context).await?;
        let found = collect_from(&client, context, source, keys).await?;
        index = merge_index(index, found);
    }

    Ok(index)
}

/// Single-context half of [`collect`], split out so tests can hand in any client.
pub async fn collect_from(
    client: &Client,
    context: &str,
    source: MetadataSource,
    keys: &BTreeSet<String>,
) -> Result<MetadataIndex> {
    let namespaces = list_namespaces(client, context).await?;
    let found = extract_metadata(&namespaces, source, keys);

    log::info!(
        "namespaces: '{context}' has {} namespace(s), {} carry a requested {source}",
        namespaces.len(),
        found.values().flat_map(|v| v.keys()).collect::<BTreeSet<_>>().len()
    );
    Ok(found)
}
