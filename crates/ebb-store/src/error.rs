//! Error types for durable record stores.

use thiserror::Error;

/// Errors that can occur in a durable record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An underlying file operation failed.
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A record or the stored state violates the backend's format.
    #[error("store format violated: {0}")]
    Persist(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
