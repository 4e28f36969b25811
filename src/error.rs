// src/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to fetch {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to decode {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode row: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid key in {family} record: {reason}")]
    InvalidKey {
        family: &'static str,
        reason: String,
    },

    #[error("invalid table selector {0}")]
    Selector(String),

    #[error("failed to read latest row of {table}: {reason}")]
    StoreQuery { table: String, reason: String },

    #[error("failed to insert into {table}: {reason}")]
    StoreInsert { table: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Classifies a reqwest failure for `url`, keeping status errors apart from transport ones.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => SyncError::Status {
                url: url.to_string(),
                status,
            },
            None => SyncError::Network {
                url: url.to_string(),
                source: err,
            },
        }
    }
}
