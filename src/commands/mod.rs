pub mod confirm;
pub mod kubeconfig;
pub mod matcher;
pub mod namespaces;
pub mod preview;
pub mod reconcile;

pub use reconcile::{apply, run, RunOptions};
