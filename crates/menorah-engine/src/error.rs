use thiserror::Error;

/// Failures reported by a persistence backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No backing store (e.g. storage disabled in the browser).
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage read failed: {0}")]
    Read(String),
    #[error("storage write failed: {0}")]
    Write(String),
    #[error("storage remove failed: {0}")]
    Remove(String),
}

/// Failures restoring candle state. Always recovered locally.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("malformed persisted state: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failures parsing engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
