//! Journal lifecycle status.
//!
//! This module provides:
//! - [`Status`] — the forward-only lifecycle states of a journal
//! - [`StatusCell`] — atomic status holder advanced by compare-and-swap

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// Lifecycle state of a journal.
///
/// Status only moves forward: `New` to `Opening` to `Open` to `Closed`. A
/// closed journal is never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Status {
    /// Constructed but not yet opened.
    New = 0,
    /// Recovery and startup in progress.
    Opening = 1,
    /// Accepting writes and searches.
    Open = 2,
    /// Shut down; writes are ignored.
    Closed = 3,
}

impl Status {
    /// Returns the lowercase string form of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::New => "new",
            Status::Opening => "opening",
            Status::Open => "open",
            Status::Closed => "closed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic cell holding a [`Status`].
///
/// Transitions go through [`StatusCell::advance`], which only succeeds when
/// the current value matches the expected predecessor. Concurrent callers
/// racing the same transition see exactly one winner.
#[derive(Debug)]
pub(crate) struct StatusCell(AtomicU8);

impl StatusCell {
    pub(crate) fn new(status: Status) -> Self {
        Self(AtomicU8::new(status as u8))
    }

    pub(crate) fn load(&self) -> Status {
        match self.0.load(Ordering::SeqCst) {
            0 => Status::New,
            1 => Status::Opening,
            2 => Status::Open,
            _ => Status::Closed,
        }
    }

    /// Moves `from` to `to`, returning `false` if another transition won.
    pub(crate) fn advance(&self, from: Status, to: Status) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}
