//! Domain-level error types.

use thiserror::Error;

/// Store-level errors - faults of the backing document store, not of the
/// request. "Not found" is not an error at this layer: lookups return
/// `Option` and conditional updates report whether they matched.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store connection failed: {0}")]
    Connection(String),

    #[error("Store operation failed: {0}")]
    Query(String),

    #[error("Document (de)serialization failed: {0}")]
    Serialization(String),
}
