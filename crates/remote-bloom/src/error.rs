//! Error types for the store-backed Bloom filter

use thiserror::Error;

/// Errors surfaced by filter operations
///
/// `NotFound` and `InvalidParameters` are never folded into a negative
/// membership answer: a `false` from `query` always means the filter exists
/// and the key was definitely never inserted.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid filter parameters: {0}")]
    InvalidParameters(String),

    #[error("Bloom filter not found: {0}")]
    NotFound(String),

    #[error("Bloom filter already exists: {0}")]
    AlreadyExists(String),

    #[error("Corrupt metadata for filter {name}: {reason}")]
    CorruptMetadata { name: String, reason: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from the backing key/value store
///
/// These propagate unchanged through the service; nothing is retried.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Command error: {0}")]
    Command(String),

    #[error("Bit offset {offset} out of range for {key}")]
    OffsetOutOfRange { key: String, offset: u64 },

    #[error("No bit buffer stored under {0}")]
    MissingBuffer(String),
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
            StoreError::Connection(err.to_string())
        } else {
            StoreError::Command(err.to_string())
        }
    }
}
