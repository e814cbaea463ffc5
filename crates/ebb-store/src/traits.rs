//! The durable store contract.
//!
//! This module provides:
//! - [`DurableStore`] — the ordered persistent record sequence the journal
//!   builds on.

use crate::error::Result;

/// An ordered, durable sequence of opaque single-line records.
///
/// Records are appended at the newest end and removed from the oldest end;
/// the store preserves insertion order and survives process restarts (for
/// persistent backends). Record contents are never interpreted: encoding and
/// decoding belong to the caller, the store only promises that a record comes
/// back exactly as it went in and that a record never contains a raw newline
/// (callers must guarantee the latter when appending).
///
/// # Contract
///
/// - `append` preserves the order of the batch and of prior records.
/// - `remove_oldest` only ever removes from the oldest end.
/// - `iter` walks oldest to newest and must stay safe under concurrent
///   appends and removals: it may observe a slightly stale view or yield
///   fewer records than `len` reported, but it never fails and never yields
///   records out of order.
pub trait DurableStore: Send + Sync {
    /// Appends a batch of records at the newest end.
    ///
    /// Atomicity is best-effort: a failed append may leave a prefix of the
    /// batch persisted. Callers tolerate this by logging and continuing.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium rejects the write.
    fn append(&self, records: &[String]) -> Result<()>;

    /// Removes up to `count` records from the oldest end.
    ///
    /// Returns the number of records actually removed, which is smaller than
    /// `count` when the store holds fewer records.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium rejects the removal. The
    /// in-memory view may already reflect the removal when this happens.
    fn remove_oldest(&self, count: usize) -> Result<usize>;

    /// Returns the number of records currently stored.
    fn len(&self) -> usize;

    /// Returns `true` if the store holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the oldest record, if any.
    fn oldest(&self) -> Option<String>;

    /// Returns a forward (oldest to newest) iterator over the records.
    ///
    /// The iterator locks the store briefly per step rather than for its
    /// whole lifetime, so it can run concurrently with writers.
    fn iter(&self) -> Box<dyn Iterator<Item = String> + '_>;
}
