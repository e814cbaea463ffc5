//! Event record codec.
//!
//! This module provides:
//! - [`encode`] / [`decode`] — single-line JSON codec for [`LogEvent`]
//! - [`MAX_ENCODED_LEN`] — upper bound on an encoded record's size
//! - [`CodecError`] — codec failure modes
//!
//! Each stored record is one JSON object on one line; the durable stores
//! treat records as opaque strings, so the codec is the only place the
//! journal's on-disk shape is decided.

use crate::types::LogEvent;

/// Largest encoded record, in bytes, that the journal will persist.
///
/// Events that encode larger than this are dropped at flush time instead of
/// being written.
pub const MAX_ENCODED_LEN: usize = 32 * 1024;

/// Errors produced while encoding or decoding event records.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The event could not be serialized.
    #[error("failed to encode event: {0}")]
    Encode(#[source] serde_json::Error),

    /// A stored record could not be parsed back into an event.
    #[error("malformed event record: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Encodes an event as a single JSON line.
///
/// The output never contains a raw newline; embedded newlines in event
/// fields are escaped by the JSON encoding.
pub fn encode(event: &LogEvent) -> Result<String, CodecError> {
    serde_json::to_string(event).map_err(CodecError::Encode)
}

/// Decodes a stored record back into an event.
pub fn decode(raw: &str) -> Result<LogEvent, CodecError> {
    serde_json::from_str(raw).map_err(CodecError::Malformed)
}
