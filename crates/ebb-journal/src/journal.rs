//! The journal facade.
//!
//! This module provides:
//! - [`Journal`] — bounded durable event journal with a background writer
//! - [`JournalStats`] — point-in-time operational numbers for a journal

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ebb_store::DurableStore;
use tracing::{debug, info, warn};

use crate::error::{JournalError, Result};
use crate::health::{HealthRecord, HealthSeverity};
use crate::search;
use crate::settings::Settings;
use crate::state::Core;
use crate::status::Status;
use crate::types::{LogEvent, SearchQuery, SearchResults, now_timestamp};
use crate::writer;

/// Stored records above `max_events` tolerated before health flags a backlog.
const BACKLOG_HEALTH_SLACK: usize = 5_000;

/// How long a write blocks re-offering an event to a full intake queue.
const WRITE_RETRY_WINDOW: Duration = Duration::from_secs(30);

/// Pause between re-offers while the intake queue is full.
const WRITE_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// How long close waits for the writer thread to notice the shutdown.
const CLOSE_WRITER_WAIT: Duration = Duration::from_secs(60);

/// Poll interval while waiting for the writer thread to stop.
const CLOSE_WRITER_POLL: Duration = Duration::from_secs(1);

/// How long close spends draining leftover queued events itself.
const CLOSE_DRAIN_WINDOW: Duration = Duration::from_secs(30);

/// A bounded, durable event journal.
///
/// Events written through [`Journal::write_event`] land on an in-memory
/// queue and are flushed to the durable store by a background writer thread,
/// which also enforces the retention limits in [`Settings`]. Searches read
/// the store directly and see events once the writer has flushed them.
///
/// The lifecycle only moves forward. [`Journal::close`] shuts the writer
/// down and drains what it can; dropping a `Journal` without closing it
/// leaves queued events behind, so embedders should close explicitly.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use ebb_journal::{Journal, Level, LogEvent, Settings};
/// use ebb_store::MemoryStore;
///
/// # fn main() -> ebb_journal::Result<()> {
/// let journal = Journal::open(&Settings::default(), Arc::new(MemoryStore::new()))?;
/// journal.write_event(LogEvent::new(Level::Info, "startup", "service listening"));
/// journal.close();
/// assert_eq!(journal.pending_event_count(), 0);
/// # Ok(())
/// # }
/// ```
pub struct Journal {
    core: Arc<Core>,
}

impl Journal {
    /// Opens a journal over `durable` and starts its writer thread.
    ///
    /// Recovery reads the oldest stored record to seed the retention cache.
    /// Opening with `max_events` of zero purges the store and fails with
    /// [`JournalError::RetentionDisabled`].
    ///
    /// # Errors
    ///
    /// Returns an error when retention is disabled, when purging a disabled
    /// store fails, or when the writer thread cannot be spawned.
    pub fn open(settings: &Settings, durable: Arc<dyn DurableStore>) -> Result<Journal> {
        let started = Instant::now();

        if settings.max_events == 0 {
            info!(
                stored = durable.len(),
                "event retention disabled, purging all stored events"
            );
            durable.remove_oldest(durable.len())?;
            return Err(JournalError::RetentionDisabled);
        }

        let core = Arc::new(Core::new(settings.normalized(), durable));
        core.status.advance(Status::New, Status::Opening);
        core.refresh_oldest();
        core.status.advance(Status::Opening, Status::Open);
        writer::spawn(Arc::clone(&core))?;

        let journal = Journal { core };
        info!(
            elapsed_ms = started.elapsed().as_millis(),
            stats = %journal.stats(),
            "journal open"
        );
        Ok(journal)
    }

    /// Queues an event for the background writer.
    ///
    /// Writes to a journal that is not open are ignored. When the intake
    /// queue is full this blocks the calling thread, re-offering the event
    /// for up to thirty seconds before discarding it with a warning.
    pub fn write_event(&self, event: LogEvent) {
        if self.core.status.load() != Status::Open || self.core.settings.max_events == 0 {
            return;
        }

        let Err(mut event) = self.core.queue.try_push(event) else {
            return;
        };

        // Queue full: hold the caller and re-offer until the window runs out.
        let started = Instant::now();
        while started.elapsed() < WRITE_RETRY_WINDOW {
            thread::sleep(WRITE_RETRY_INTERVAL);
            match self.core.queue.try_push(event) {
                Ok(()) => return,
                Err(rejected) => event = rejected,
            }
        }

        self.core.note_backpressure_drop();
        warn!(
            topic = %event.topic,
            level = %event.level,
            timestamp = event.timestamp,
            capacity = self.core.queue.capacity(),
            "discarding event, intake queue still full after backpressure window"
        );
    }

    /// Searches stored events.
    ///
    /// Only events the writer has already flushed are visible; queued events
    /// are not searched.
    #[must_use]
    pub fn search(&self, query: &SearchQuery) -> SearchResults {
        search::execute(&self.core, query)
    }

    /// Closes the journal.
    ///
    /// Marks the journal closed, waits for the writer thread to stop, then
    /// drains any events still queued. Events that cannot be drained within
    /// the close window are abandoned with a warning. Closing an already
    /// closed journal does nothing.
    pub fn close(&self) {
        if !self.core.status.advance(Status::Open, Status::Closed) {
            return;
        }
        debug!(stats = %self.stats(), "journal closing");

        // The writer notices the status change at its next loop check.
        let started = Instant::now();
        while self.core.writer_active() && started.elapsed() < CLOSE_WRITER_WAIT {
            thread::sleep(CLOSE_WRITER_POLL);
            if self.core.writer_active() {
                debug!("waiting for writer thread to stop");
            }
        }

        if self.core.writer_active() {
            warn!("writer thread still running after shutdown wait");
        } else {
            let drain_started = Instant::now();
            while !self.core.queue.is_empty() && drain_started.elapsed() < CLOSE_DRAIN_WINDOW {
                writer::flush_queue(&self.core);
            }
        }

        let abandoned = self.core.queue.len();
        if abandoned > 0 {
            warn!(abandoned, "abandoning queued events at close");
        }
        debug!(stats = %self.stats(), "journal closed");
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> Status {
        self.core.status.load()
    }

    /// Number of events in the durable store.
    #[must_use]
    pub fn stored_event_count(&self) -> usize {
        self.core.durable.len()
    }

    /// Number of events queued but not yet flushed.
    #[must_use]
    pub fn pending_event_count(&self) -> usize {
        self.core.queue.len()
    }

    /// Timestamp of the oldest stored event, if known.
    #[must_use]
    pub fn oldest_timestamp(&self) -> Option<i64> {
        self.core.cached_oldest()
    }

    /// The journal's effective settings, after open-time normalization.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.core.settings
    }

    /// Snapshot of the journal's operational numbers.
    #[must_use]
    pub fn stats(&self) -> JournalStats {
        JournalStats {
            stored_events: self.core.durable.len(),
            pending_events: self.core.queue.len(),
            max_events: self.core.settings.max_events,
            oldest_timestamp: self.core.cached_oldest(),
            batch_size: self.core.calculator.size(),
            dropped_oversize: self.core.oversize_drops(),
            dropped_backpressure: self.core.backpressure_drops(),
            dirty_for: self.core.dirty_for(),
        }
    }

    /// Reports conditions an operator should know about.
    ///
    /// A journal that is not open yields a single warning. An open journal
    /// yields a caution when the store has grown well past its configured
    /// maximum, and another when the oldest stored event is past its age
    /// limit; an empty result means the journal looks healthy.
    #[must_use]
    pub fn health_check(&self) -> Vec<HealthRecord> {
        let status = self.status();
        if status != Status::Open {
            return vec![HealthRecord::new(
                HealthSeverity::Warn,
                format!("journal is not open, status is {status}"),
            )];
        }

        let mut findings = Vec::new();

        let stored = self.core.durable.len();
        let max_events = self.core.settings.max_events;
        if stored > max_events + BACKLOG_HEALTH_SLACK {
            findings.push(HealthRecord::new(
                HealthSeverity::Caution,
                format!("record count of {stored} exceeds the configured maximum of {max_events}"),
            ));
        }

        let max_age = self.core.settings.max_age;
        if !max_age.is_zero() {
            if let Some(oldest_ms) = self.core.cached_oldest() {
                let age_ms = now_timestamp().saturating_sub(oldest_ms);
                if u128::try_from(age_ms).is_ok_and(|age| age > max_age.as_millis()) {
                    findings.push(HealthRecord::new(
                        HealthSeverity::Caution,
                        format!(
                            "oldest stored event is older than the configured maximum age of {}s",
                            max_age.as_secs()
                        ),
                    ));
                }
            }
        }

        findings
    }
}

impl fmt::Debug for Journal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Journal")
            .field("status", &self.status())
            .field("stats", &self.stats())
            .finish()
    }
}

/// Point-in-time operational numbers for a journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalStats {
    /// Events in the durable store.
    pub stored_events: usize,
    /// Events queued but not yet flushed.
    pub pending_events: usize,
    /// Configured retention cap.
    pub max_events: usize,
    /// Timestamp of the oldest stored event, if known.
    pub oldest_timestamp: Option<i64>,
    /// Current adaptive batch size.
    pub batch_size: usize,
    /// Events dropped for exceeding the encoded size limit.
    pub dropped_oversize: u64,
    /// Events dropped after the write backpressure window expired.
    pub dropped_backpressure: u64,
    /// How long the oldest queued event has been waiting.
    pub dirty_for: Duration,
}

impl JournalStats {
    /// Stored events as a percentage of the retention cap.
    #[must_use]
    pub fn utilization_percent(&self) -> f64 {
        if self.max_events == 0 {
            return 0.0;
        }
        (self.stored_events as f64 / self.max_events as f64) * 100.0
    }
}

impl fmt::Display for JournalStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "events={}/{} ({:.3}%), pending={}, batch={}, dropped_oversize={}, dropped_backpressure={}",
            self.stored_events,
            self.max_events,
            self.utilization_percent(),
            self.pending_events,
            self.batch_size,
            self.dropped_oversize,
            self.dropped_backpressure
        )
    }
}
