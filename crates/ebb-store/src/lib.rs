//! Ordered durable record stores backing the ebb event journal.
//!
//! This crate defines the contract the journal persists through: an ordered
//! sequence of opaque single-line records that supports appending at the
//! newest end, removing from the oldest end, and forward iteration. Batching,
//! retention, and search all live a layer up in `ebb-journal`; this crate
//! only moves records.
//!
//! # Quick Start
//!
//! ```rust
//! use ebb_store::{DurableStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.append(&["hello".to_string()]).unwrap();
//! assert_eq!(store.oldest().as_deref(), Some("hello"));
//! ```
//!
//! # Modules
//!
//! - [`traits`] — the [`DurableStore`] contract
//! - [`memory`] — in-memory backend for tests and ephemeral embedding
//! - [`file`] — single-file backend with head-offset removal and compaction
//! - [`error`] — store error types

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::DurableStore;
