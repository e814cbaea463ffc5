//! Core event and query types for the journal.
//!
//! This module provides:
//! - [`Level`] — severity ladder for journal events
//! - [`EventKind`] — user-attributed versus system events
//! - [`LogEvent`] — a single timestamped journal entry
//! - [`SearchQuery`] — filters and bounds for a search pass
//! - [`SearchResults`] — matched events plus scan statistics

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default result cap for a [`SearchQuery`].
const DEFAULT_MAX_RESULTS: usize = 100;

/// Default wall-clock budget for a [`SearchQuery`].
const DEFAULT_TIME_BUDGET: Duration = Duration::from_secs(30);

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Severity level of a journal event, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Level {
    /// Fine-grained diagnostic detail.
    Trace = 0,
    /// Debug-level detail.
    Debug = 1,
    /// Routine informational events.
    Info = 2,
    /// Something unexpected that the system recovered from.
    Warn = 3,
    /// An operation failed.
    Error = 4,
    /// The system cannot continue.
    Fatal = 5,
}

impl Level {
    /// Returns `true` if this level is at or above `other` in severity.
    #[must_use]
    pub fn is_at_least(self, other: Level) -> bool {
        self >= other
    }

    /// Returns the lowercase string form of the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an event is attributed to a user or to the system itself.
///
/// Derived from the event's actor field rather than stored: see
/// [`LogEvent::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// The event carries a non-empty actor.
    User,
    /// The event has no actor attached.
    System,
}

impl EventKind {
    /// Returns the lowercase string form of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::User => "user",
            EventKind::System => "system",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single journal event.
///
/// Events are created with [`LogEvent::new`] and refined with the `with_*`
/// builders before being handed to the journal.
///
/// # Example
///
/// ```rust
/// use ebb_journal::{EventKind, Level, LogEvent};
///
/// let event = LogEvent::new(Level::Warn, "auth", "login rejected")
///     .with_actor("alice")
///     .with_source("10.0.0.7");
///
/// assert_eq!(event.kind(), EventKind::User);
/// assert!(event.level.is_at_least(Level::Info));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Severity of the event.
    pub level: Level,
    /// The user the event is attributed to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    /// Subsystem or category the event belongs to.
    pub topic: String,
    /// Human-readable description of what happened.
    pub message: String,
    /// Where the event originated, such as a network address.
    #[serde(default)]
    pub source: String,
}

impl LogEvent {
    /// Creates an event stamped with the current wall-clock time.
    #[must_use]
    pub fn new(level: Level, topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: now_timestamp(),
            level,
            actor: None,
            topic: topic.into(),
            message: message.into(),
            source: String::new(),
        }
    }

    /// Replaces the timestamp, in milliseconds since the Unix epoch.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Attributes the event to an actor.
    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Records where the event originated.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Classifies the event by attribution.
    ///
    /// Events with a non-empty actor are [`EventKind::User`]; everything
    /// else is [`EventKind::System`].
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self.actor.as_deref() {
            Some(actor) if !actor.is_empty() => EventKind::User,
            _ => EventKind::System,
        }
    }

    /// Age of the event relative to `now` in epoch milliseconds.
    ///
    /// Future-dated events report zero age.
    #[must_use]
    pub fn age(&self, now: i64) -> Duration {
        u64::try_from(now.saturating_sub(self.timestamp))
            .map_or(Duration::ZERO, Duration::from_millis)
    }
}

/// Filters and bounds for a journal search.
///
/// All filters are optional; an unset filter matches every event. The
/// default query returns up to 100 events within a 30 second budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Only match events at or above this severity.
    pub min_level: Option<Level>,
    /// Stop after collecting this many matches.
    pub max_results: usize,
    /// Actor filter, interpreted as a regular expression when it compiles
    /// and as a case-insensitive literal otherwise.
    pub actor: Option<String>,
    /// Case-insensitive substring matched against message and topic.
    pub text: Option<String>,
    /// Only match events of this kind.
    pub kind: Option<EventKind>,
    /// Wall-clock budget for the scan.
    pub time_budget: Duration,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            min_level: None,
            max_results: DEFAULT_MAX_RESULTS,
            actor: None,
            text: None,
            kind: None,
            time_budget: DEFAULT_TIME_BUDGET,
        }
    }
}

impl SearchQuery {
    /// Creates a query with no filters and default bounds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only match events at or above `level`.
    #[must_use]
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = Some(level);
        self
    }

    /// Stop after collecting `max_results` matches.
    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Filter by actor.
    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Filter by message or topic text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Filter by event kind.
    #[must_use]
    pub fn with_kind(mut self, kind: EventKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Limit the wall-clock time spent scanning.
    #[must_use]
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }
}

/// Outcome of a journal search.
#[derive(Debug, Clone)]
pub struct SearchResults {
    /// Matched events, newest first.
    pub events: Vec<LogEvent>,
    /// How many stored records the scan examined.
    pub examined: usize,
    /// Wall-clock time the scan took.
    pub elapsed: Duration,
    /// Whether the scan stopped because the time budget ran out.
    pub hit_time_budget: bool,
}

impl SearchResults {
    /// Number of matched events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if no events matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
