use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing input or credential. Raised before any cluster or network call.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to read {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}:{line}: {reason}", path.display())]
    InvalidRow {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("kubeconfig: {0}")]
    Kubeconfig(String),

    #[error("context '{context}': {message}")]
    Cluster { context: String, message: String },

    #[error("gave up on {url} after {attempts} attempt(s)")]
    MaxRetriesExceeded { url: String, attempts: u32 },

    #[error("{url} returned {status}: {body}")]
    Api { url: String, status: u16, body: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("team {team_id}: {reason}")]
    InvalidTeam { team_id: String, reason: String },

    #[error("action cancelled by operator")]
    Aborted,

    #[error(transparent)]
    Prompt(#[from] dialoguer::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
