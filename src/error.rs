use thiserror::Error;

/// Settings problems detected before any external call is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required settings: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum RemoteError {
    /// Listing assigned issues failed. Fatal for the run.
    #[error("issue search failed: {0}")]
    Query(String),

    #[error("issue {0} not found")]
    NotFound(String),

    /// A get or update on a single issue failed.
    #[error("request for issue {key} failed: {reason}")]
    Item { key: String, reason: String },
}

#[derive(Debug, Error)]
pub enum LocalStoreError {
    #[error("automation bridge failed: {0}")]
    Bridge(String),

    #[error("automation bridge timed out after {0}s")]
    Timeout(u64),
}

/// Outcomes that abort a whole run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("could not read local task snapshot: {0}")]
    LocalSnapshot(#[source] LocalStoreError),
}
