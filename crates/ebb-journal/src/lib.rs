//! Bounded durable event journal.
//!
//! `ebb-journal` keeps a rolling window of application events in a durable
//! store. Writers hand events to an in-memory intake queue and return
//! immediately; a background writer thread flushes the queue in adaptively
//! sized batches and enforces the retention limits, purging the oldest
//! records once the store is over its count cap or events outlive their
//! maximum age. Stored events are queried with filtered, time-budgeted
//! searches that return newest first.
//!
//! The store itself is pluggable through [`ebb_store::DurableStore`];
//! `ebb-store` ships a file-backed store and an in-memory one.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use ebb_journal::{Journal, Level, LogEvent, SearchQuery, Settings};
//! use ebb_store::MemoryStore;
//!
//! # fn main() -> ebb_journal::Result<()> {
//! let settings = Settings::default().with_max_events(10_000);
//! let journal = Journal::open(&settings, Arc::new(MemoryStore::new()))?;
//!
//! journal.write_event(
//!     LogEvent::new(Level::Warn, "auth", "login rejected").with_actor("alice"),
//! );
//!
//! let results = journal.search(&SearchQuery::new().with_actor("alice"));
//! journal.close();
//! # let _ = results;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`journal`] — the [`Journal`] facade and its stats
//! - [`types`] — events, severity levels, queries, and results
//! - [`settings`] — retention and pacing configuration
//! - [`batch`] — adaptive write batch sizing
//! - [`codec`] — single-line JSON record codec
//! - [`status`] — journal lifecycle status
//! - [`health`] — self-reported health findings
//! - [`error`] — journal error types

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod codec;
pub mod error;
pub mod health;
pub mod journal;
mod queue;
mod search;
pub mod settings;
mod state;
pub mod status;
pub mod types;
mod writer;

pub use batch::BatchSizeCalculator;
pub use error::{JournalError, Result};
pub use health::{HealthRecord, HealthSeverity};
pub use journal::{Journal, JournalStats};
pub use settings::{MIN_MAX_EVENTS, PurgePolicy, Settings};
pub use status::Status;
pub use types::{EventKind, Level, LogEvent, SearchQuery, SearchResults};
