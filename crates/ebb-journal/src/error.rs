//! Error types for journal operations.

use ebb_store::StoreError;

/// Errors that can occur while opening or operating a journal.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// The journal was configured with `max_events = 0`, which disables
    /// event retention entirely. Any previously stored events have been
    /// purged and the journal cannot be opened.
    #[error("event retention is disabled (max_events = 0), stored events purged")]
    RetentionDisabled,

    /// The durable store reported a failure.
    #[error("durable store error: {0}")]
    Store(#[from] StoreError),

    /// The background writer thread could not be started.
    #[error("failed to start writer thread: {0}")]
    WriterSpawn(#[from] std::io::Error),
}

/// Convenience result alias for journal operations.
pub type Result<T> = std::result::Result<T, JournalError>;
