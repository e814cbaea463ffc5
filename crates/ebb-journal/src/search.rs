//! Filtered, time-budgeted search over stored events.
//!
//! This module provides:
//! - [`execute`] — one pass over the durable store applying query filters
//!
//! Scans walk the store oldest-first and stop at the result cap, at the end
//! of the records that existed when the scan started, or when the time
//! budget runs out. Matches are returned sorted newest-first.

use std::time::Instant;

use regex::Regex;
use tracing::{debug, trace};

use crate::state::Core;
use crate::types::{LogEvent, SearchQuery, SearchResults};

/// Runs `query` against the stored events.
pub(crate) fn execute(core: &Core, query: &SearchQuery) -> SearchResults {
    let started = Instant::now();
    let max_returned = query.max_results.min(core.settings.max_events);
    let stored = core.durable.len();
    let actor = ActorMatcher::compile(query.actor.as_deref());

    let mut events = Vec::new();
    let mut examined = 0usize;
    let mut hit_time_budget = false;

    let mut records = core.durable.iter();
    while events.len() < max_returned && examined < stored {
        let Some(raw) = records.next() else { break };
        examined += 1;

        if let Some(event) = core.decode_record(&raw) {
            if matches(&event, query, &actor) {
                events.push(event);
            }
        }

        if started.elapsed() > query.time_budget {
            hit_time_budget = true;
            break;
        }
    }

    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let elapsed = started.elapsed();
    debug!(
        examined,
        matched = events.len(),
        elapsed_ms = elapsed.as_millis(),
        hit_time_budget,
        "search scan complete"
    );

    SearchResults {
        events,
        examined,
        elapsed,
        hit_time_budget,
    }
}

/// Compiled actor filter.
///
/// A filter that parses as a regular expression matches by unanchored
/// pattern search; one that does not parse matches as a case-insensitive
/// literal. Events without an actor never match a non-empty filter.
enum ActorMatcher {
    Any,
    Pattern(Regex),
    Literal(String),
}

impl ActorMatcher {
    fn compile(filter: Option<&str>) -> Self {
        match filter {
            None | Some("") => ActorMatcher::Any,
            Some(filter) => match Regex::new(filter) {
                Ok(pattern) => ActorMatcher::Pattern(pattern),
                Err(_) => {
                    trace!(filter, "actor filter is not a valid pattern, comparing literally");
                    ActorMatcher::Literal(filter.to_lowercase())
                }
            },
        }
    }

    fn matches(&self, actor: Option<&str>) -> bool {
        match self {
            ActorMatcher::Any => true,
            ActorMatcher::Pattern(pattern) => actor.is_some_and(|a| pattern.is_match(a)),
            ActorMatcher::Literal(expected) => {
                actor.is_some_and(|a| a.to_lowercase() == *expected)
            }
        }
    }
}

fn matches(event: &LogEvent, query: &SearchQuery, actor: &ActorMatcher) -> bool {
    if let Some(min_level) = query.min_level {
        if !event.level.is_at_least(min_level) {
            return false;
        }
    }
    if !actor.matches(event.actor.as_deref()) {
        return false;
    }
    if let Some(text) = query.text.as_deref() {
        if !text.is_empty() && !matches_text(event, text) {
            return false;
        }
    }
    query.kind.is_none_or(|kind| event.kind() == kind)
}

fn matches_text(event: &LogEvent, text: &str) -> bool {
    let needle = text.to_lowercase();
    event.message.to_lowercase().contains(&needle)
        || event.topic.to_lowercase().contains(&needle)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use ebb_store::MemoryStore;

    use crate::codec;
    use crate::settings::Settings;
    use crate::types::{EventKind, Level};

    use super::*;

    fn core_with_events(settings: Settings, events: &[LogEvent]) -> Core {
        let records: Vec<String> = events
            .iter()
            .map(|event| codec::encode(event).unwrap())
            .collect();
        Core::new(
            settings.normalized(),
            Arc::new(MemoryStore::with_records(records)),
        )
    }

    fn event(timestamp: i64, level: Level, message: &str) -> LogEvent {
        LogEvent::new(level, "app", message).with_timestamp(timestamp)
    }

    // ========================================================================
    // Filters
    // ========================================================================

    #[test]
    fn unfiltered_query_returns_newest_first() {
        let core = core_with_events(
            Settings::default(),
            &[
                event(10, Level::Info, "first"),
                event(30, Level::Info, "third"),
                event(20, Level::Info, "second"),
            ],
        );

        let results = execute(&core, &SearchQuery::new());
        let timestamps: Vec<i64> = results.events.iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![30, 20, 10]);
        assert_eq!(results.examined, 3);
        assert!(!results.hit_time_budget);
    }

    #[test]
    fn equal_timestamps_keep_store_order() {
        let core = core_with_events(
            Settings::default(),
            &[
                event(5, Level::Info, "first"),
                event(5, Level::Info, "second"),
                event(5, Level::Info, "third"),
            ],
        );

        let results = execute(&core, &SearchQuery::new());
        let messages: Vec<&str> = results.events.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn min_level_excludes_lower_severities() {
        let core = core_with_events(
            Settings::default(),
            &[
                event(1, Level::Debug, "noise"),
                event(2, Level::Warn, "warning"),
                event(3, Level::Error, "failure"),
            ],
        );

        let results = execute(&core, &SearchQuery::new().with_min_level(Level::Warn));
        assert_eq!(results.len(), 2);
        assert_eq!(results.events[0].message, "failure");
        assert_eq!(results.events[1].message, "warning");
    }

    #[test]
    fn actor_filter_matches_as_unanchored_pattern() {
        let core = core_with_events(
            Settings::default(),
            &[
                event(1, Level::Info, "a").with_actor("alice"),
                event(2, Level::Info, "b").with_actor("bob"),
                event(3, Level::Info, "c").with_actor("malice"),
            ],
        );

        let results = execute(&core, &SearchQuery::new().with_actor("li"));
        assert_eq!(results.len(), 2);

        let results = execute(&core, &SearchQuery::new().with_actor("^ali"));
        assert_eq!(results.len(), 1);
        assert_eq!(results.events[0].actor.as_deref(), Some("alice"));
    }

    #[test]
    fn invalid_pattern_falls_back_to_literal_comparison() {
        let core = core_with_events(
            Settings::default(),
            &[
                event(1, Level::Info, "a").with_actor("["),
                event(2, Level::Info, "b").with_actor("[x"),
            ],
        );

        // "[" is not a valid pattern, so it must match the actor literally.
        let results = execute(&core, &SearchQuery::new().with_actor("["));
        assert_eq!(results.len(), 1);
        assert_eq!(results.events[0].actor.as_deref(), Some("["));
    }

    #[test]
    fn literal_comparison_ignores_case() {
        let core = core_with_events(
            Settings::default(),
            &[event(1, Level::Info, "a").with_actor("alice[")],
        );

        let results = execute(&core, &SearchQuery::new().with_actor("ALICE["));
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn events_without_an_actor_never_match_an_actor_filter() {
        let core = core_with_events(
            Settings::default(),
            &[event(1, Level::Info, "system event")],
        );

        assert!(execute(&core, &SearchQuery::new().with_actor(".*")).is_empty());
        assert!(execute(&core, &SearchQuery::new().with_actor("[")).is_empty());
    }

    #[test]
    fn empty_actor_filter_matches_everything() {
        let core = core_with_events(
            Settings::default(),
            &[
                event(1, Level::Info, "a"),
                event(2, Level::Info, "b").with_actor("bob"),
            ],
        );

        let results = execute(&core, &SearchQuery::new().with_actor(""));
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn text_filter_searches_message_and_topic() {
        let mut background = event(2, Level::Info, "routine tick");
        background.topic = "session-cleanup".to_string();
        let core = core_with_events(
            Settings::default(),
            &[event(1, Level::Info, "login DENIED for bob"), background],
        );

        let results = execute(&core, &SearchQuery::new().with_text("denied"));
        assert_eq!(results.len(), 1);
        assert_eq!(results.events[0].timestamp, 1);

        let results = execute(&core, &SearchQuery::new().with_text("CLEANUP"));
        assert_eq!(results.len(), 1);
        assert_eq!(results.events[0].timestamp, 2);
    }

    #[test]
    fn empty_text_filter_matches_everything() {
        let core = core_with_events(Settings::default(), &[event(1, Level::Info, "a")]);
        let results = execute(&core, &SearchQuery::new().with_text(""));
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn kind_filter_separates_user_and_system_events() {
        let core = core_with_events(
            Settings::default(),
            &[
                event(1, Level::Info, "boot"),
                event(2, Level::Info, "login").with_actor("alice"),
            ],
        );

        let users = execute(&core, &SearchQuery::new().with_kind(EventKind::User));
        assert_eq!(users.len(), 1);
        assert_eq!(users.events[0].timestamp, 2);

        let system = execute(&core, &SearchQuery::new().with_kind(EventKind::System));
        assert_eq!(system.len(), 1);
        assert_eq!(system.events[0].timestamp, 1);
    }

    // ========================================================================
    // Bounds
    // ========================================================================

    #[test]
    fn result_cap_stops_the_scan_early() {
        let events: Vec<LogEvent> = (0..10)
            .map(|n| event(n, Level::Info, "tick"))
            .collect();
        let core = core_with_events(Settings::default(), &events);

        let results = execute(&core, &SearchQuery::new().with_max_results(3));
        // The scan walks oldest-first, so the cap keeps the oldest window.
        let timestamps: Vec<i64> = results.events.iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![2, 1, 0]);
        assert_eq!(results.examined, 3);
    }

    #[test]
    fn result_cap_never_exceeds_max_events() {
        let events: Vec<LogEvent> = (0..120)
            .map(|n| event(n, Level::Info, "tick"))
            .collect();
        let core = core_with_events(Settings::default().with_max_events(100), &events);

        let results = execute(&core, &SearchQuery::new().with_max_results(usize::MAX));
        assert_eq!(results.len(), 100);
        assert_eq!(results.events[0].timestamp, 99);
    }

    #[test]
    fn zero_time_budget_returns_partial_results() {
        let events: Vec<LogEvent> = (0..50)
            .map(|n| event(n, Level::Info, "tick"))
            .collect();
        let core = core_with_events(Settings::default(), &events);

        let results = execute(
            &core,
            &SearchQuery::new().with_time_budget(Duration::ZERO),
        );
        assert!(results.hit_time_budget);
        assert!(results.examined >= 1);
        assert!(results.examined < 50);
    }

    #[test]
    fn empty_store_yields_empty_results() {
        let core = core_with_events(Settings::default(), &[]);
        let results = execute(&core, &SearchQuery::new());
        assert!(results.is_empty());
        assert_eq!(results.examined, 0);
        assert!(!results.hit_time_budget);
    }

    #[test]
    fn undecodable_records_are_skipped_but_examined() {
        let records = vec![
            "garbage".to_string(),
            codec::encode(&event(1, Level::Info, "ok")).unwrap(),
            codec::encode(&event(2, Level::Info, "ok")).unwrap(),
        ];
        let core = Core::new(
            Settings::default().normalized(),
            Arc::new(MemoryStore::with_records(records)),
        );

        let results = execute(&core, &SearchQuery::new());
        assert_eq!(results.len(), 2);
        assert_eq!(results.examined, 3);
    }
}
