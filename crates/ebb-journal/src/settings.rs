//! Journal configuration.
//!
//! This module provides:
//! - [`Settings`] — retention, queueing, and pacing knobs for a journal
//! - [`PurgePolicy`] — how aggressively age-based purging removes records
//! - [`MIN_MAX_EVENTS`] — floor applied to small non-zero retention caps

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Smallest usable retention cap.
///
/// Non-zero `max_events` values below this are raised to it when the journal
/// opens; a cap of zero disables retention entirely and is left alone.
pub const MIN_MAX_EVENTS: usize = 100;

const DEFAULT_MAX_EVENTS: usize = 100_000;
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24 * 28);
const DEFAULT_FLUSH_IDLE_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_QUEUE_CAPACITY: usize = 5_000;

const DEFAULT_BACKLOG_THRESHOLD: usize = 50_000;
const DEFAULT_PURGE_BATCH_SIZE: usize = 500;
const DEFAULT_PURGE_STEP_SIZE: usize = 1;

/// Controls how many records an age-triggered purge removes per writer cycle.
///
/// When the oldest stored record is past its age limit, the writer removes
/// `step_size` records per cycle, switching to `batch_size` once the store
/// holds more than `backlog_threshold` records. The defaults drain a large
/// backlog without starving intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurgePolicy {
    /// Stored-record count above which age purging switches to batches.
    pub backlog_threshold: usize,
    /// Records removed per cycle while above the backlog threshold.
    pub batch_size: usize,
    /// Records removed per cycle while at or below the backlog threshold.
    pub step_size: usize,
}

impl Default for PurgePolicy {
    fn default() -> Self {
        Self {
            backlog_threshold: DEFAULT_BACKLOG_THRESHOLD,
            batch_size: DEFAULT_PURGE_BATCH_SIZE,
            step_size: DEFAULT_PURGE_STEP_SIZE,
        }
    }
}

/// Configuration for a journal.
///
/// Construct with [`Settings::default`] and refine with the `with_*`
/// builders. The journal keeps its own copy at open time, so later changes
/// to a caller's `Settings` value never affect a running journal.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use ebb_journal::Settings;
///
/// let settings = Settings::default()
///     .with_max_events(10_000)
///     .with_max_age(Duration::from_secs(60 * 60 * 24 * 7));
///
/// assert_eq!(settings.max_events, 10_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum number of stored events before count-based purging starts.
    ///
    /// Zero disables retention: opening a journal with a zero cap purges the
    /// store and fails. Non-zero values below [`MIN_MAX_EVENTS`] are raised
    /// to the floor at open time.
    pub max_events: usize,
    /// Maximum age of a stored event before age-based purging removes it.
    ///
    /// [`Duration::ZERO`] disables age-based purging.
    pub max_age: Duration,
    /// How long the writer sleeps when a cycle finds little or no work.
    pub flush_idle_interval: Duration,
    /// Capacity of the in-memory intake queue.
    pub queue_capacity: usize,
    /// Pacing of age-based purging.
    pub purge_policy: PurgePolicy,
    /// Emit per-cycle writer diagnostics at trace level.
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_events: DEFAULT_MAX_EVENTS,
            max_age: DEFAULT_MAX_AGE,
            flush_idle_interval: DEFAULT_FLUSH_IDLE_INTERVAL,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            purge_policy: PurgePolicy::default(),
            debug: false,
        }
    }
}

impl Settings {
    /// Sets the maximum number of stored events.
    #[must_use]
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }

    /// Sets the maximum stored event age.
    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Sets the writer's idle sleep interval.
    #[must_use]
    pub fn with_flush_idle_interval(mut self, interval: Duration) -> Self {
        self.flush_idle_interval = interval;
        self
    }

    /// Sets the intake queue capacity.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Sets the age-purge pacing policy.
    #[must_use]
    pub fn with_purge_policy(mut self, policy: PurgePolicy) -> Self {
        self.purge_policy = policy;
        self
    }

    /// Enables per-cycle writer diagnostics.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Returns a copy with out-of-range values raised to usable minimums.
    ///
    /// A zero `max_events` is preserved so the caller can reject it; every
    /// other degenerate value is clamped with a warning.
    pub(crate) fn normalized(&self) -> Self {
        let mut settings = self.clone();
        if settings.max_events > 0 && settings.max_events < MIN_MAX_EVENTS {
            warn!(
                configured = settings.max_events,
                floor = MIN_MAX_EVENTS,
                "max_events is below the supported floor, raising it"
            );
            settings.max_events = MIN_MAX_EVENTS;
        }
        if settings.queue_capacity == 0 {
            warn!("queue_capacity of 0 is unusable, raising it to 1");
            settings.queue_capacity = 1;
        }
        if settings.purge_policy.batch_size == 0 {
            warn!("purge batch_size of 0 is unusable, raising it to 1");
            settings.purge_policy.batch_size = 1;
        }
        if settings.purge_policy.step_size == 0 {
            warn!("purge step_size of 0 is unusable, raising it to 1");
            settings.purge_policy.step_size = 1;
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::default();
        assert_eq!(settings.max_events, 100_000);
        assert_eq!(settings.max_age, Duration::from_secs(2_419_200));
        assert_eq!(settings.flush_idle_interval, Duration::from_secs(1));
        assert_eq!(settings.queue_capacity, 5_000);
        assert_eq!(settings.purge_policy.backlog_threshold, 50_000);
        assert_eq!(settings.purge_policy.batch_size, 500);
        assert_eq!(settings.purge_policy.step_size, 1);
        assert!(!settings.debug);
    }

    #[test]
    fn normalized_raises_small_max_events_to_floor() {
        let settings = Settings::default().with_max_events(5).normalized();
        assert_eq!(settings.max_events, MIN_MAX_EVENTS);
    }

    #[test]
    fn normalized_preserves_zero_max_events() {
        let settings = Settings::default().with_max_events(0).normalized();
        assert_eq!(settings.max_events, 0);
    }

    #[test]
    fn normalized_leaves_large_max_events_alone() {
        let settings = Settings::default().with_max_events(250_000).normalized();
        assert_eq!(settings.max_events, 250_000);
    }

    #[test]
    fn normalized_raises_zero_queue_capacity() {
        let settings = Settings::default().with_queue_capacity(0).normalized();
        assert_eq!(settings.queue_capacity, 1);
    }

    #[test]
    fn normalized_raises_zero_purge_policy_fields() {
        let policy = PurgePolicy {
            backlog_threshold: 10,
            batch_size: 0,
            step_size: 0,
        };
        let settings = Settings::default().with_purge_policy(policy).normalized();
        assert_eq!(settings.purge_policy.batch_size, 1);
        assert_eq!(settings.purge_policy.step_size, 1);
        assert_eq!(settings.purge_policy.backlog_threshold, 10);
    }

    #[test]
    fn builders_chain() {
        let settings = Settings::default()
            .with_max_events(500)
            .with_max_age(Duration::from_secs(3_600))
            .with_flush_idle_interval(Duration::from_millis(50))
            .with_queue_capacity(64)
            .with_debug(true);

        assert_eq!(settings.max_events, 500);
        assert_eq!(settings.max_age, Duration::from_secs(3_600));
        assert_eq!(settings.flush_idle_interval, Duration::from_millis(50));
        assert_eq!(settings.queue_capacity, 64);
        assert!(settings.debug);
    }

    #[test]
    fn deserializes_from_empty_object() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn deserializes_partial_overrides() {
        let settings: Settings =
            serde_json::from_str("{\"max_events\": 1234, \"debug\": true}").unwrap();
        assert_eq!(settings.max_events, 1234);
        assert!(settings.debug);
        assert_eq!(settings.queue_capacity, 5_000);
    }
}
