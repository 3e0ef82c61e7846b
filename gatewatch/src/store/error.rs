//! Error types for the durable store.

use thiserror::Error;

/// Durable store failures.
///
/// Callers log these and treat the read as a miss; they never block a
/// response.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}
