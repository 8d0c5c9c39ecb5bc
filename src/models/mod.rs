pub mod config;
pub mod k8s;
pub mod team;

pub use config::{TeamConfigRow, ZoneConfigRow};
pub use k8s::{MetadataIndex, MetadataSource, NamespaceValues};
pub use team::{RunSummary, TeamMatch, TeamOutcome};
