//! State shared between the journal facade and the writer thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use ebb_store::DurableStore;
use tracing::warn;

use crate::batch::BatchSizeCalculator;
use crate::codec;
use crate::queue::IntakeQueue;
use crate::settings::Settings;
use crate::status::{Status, StatusCell};
use crate::types::{LogEvent, now_timestamp};

/// Sentinel meaning the timestamp of the oldest stored record is unknown.
pub(crate) const OLDEST_UNKNOWN: i64 = -1;

/// Everything both sides of the journal share.
///
/// The facade and the writer thread each hold an `Arc<Core>`; all fields are
/// either immutable after construction or internally synchronized.
pub(crate) struct Core {
    pub(crate) settings: Settings,
    pub(crate) status: StatusCell,
    pub(crate) queue: IntakeQueue,
    pub(crate) durable: Arc<dyn DurableStore>,
    pub(crate) calculator: BatchSizeCalculator,
    /// Cached timestamp of the oldest stored record, or [`OLDEST_UNKNOWN`].
    oldest_ms: AtomicI64,
    writer_active: AtomicBool,
    decode_warned: AtomicBool,
    dropped_oversize: AtomicU64,
    dropped_backpressure: AtomicU64,
    last_flush_ms: AtomicI64,
}

impl Core {
    /// Builds shared state around an already-normalized `Settings`.
    pub(crate) fn new(settings: Settings, durable: Arc<dyn DurableStore>) -> Self {
        let queue = IntakeQueue::new(settings.queue_capacity);
        let calculator = BatchSizeCalculator::new(settings.queue_capacity);
        Self {
            settings,
            status: StatusCell::new(Status::New),
            queue,
            durable,
            calculator,
            oldest_ms: AtomicI64::new(OLDEST_UNKNOWN),
            writer_active: AtomicBool::new(false),
            decode_warned: AtomicBool::new(false),
            dropped_oversize: AtomicU64::new(0),
            dropped_backpressure: AtomicU64::new(0),
            last_flush_ms: AtomicI64::new(now_timestamp()),
        }
    }

    /// Decodes a stored record, skipping records that fail to parse.
    ///
    /// The first failure is logged at warn level; later failures are
    /// silently skipped so a corrupt region cannot flood the log.
    pub(crate) fn decode_record(&self, raw: &str) -> Option<LogEvent> {
        match codec::decode(raw) {
            Ok(event) => Some(event),
            Err(err) => {
                if !self.decode_warned.swap(true, Ordering::Relaxed) {
                    warn!(
                        error = %err,
                        "skipping undecodable event record (further occurrences suppressed)"
                    );
                }
                None
            }
        }
    }

    /// Timestamp of the oldest stored record, if known.
    pub(crate) fn cached_oldest(&self) -> Option<i64> {
        match self.oldest_ms.load(Ordering::Relaxed) {
            OLDEST_UNKNOWN => None,
            ms => Some(ms),
        }
    }

    /// Re-reads the oldest stored record and refreshes the cache.
    ///
    /// An empty store or an undecodable tail record leaves the cache
    /// unknown; the writer resolves the latter by removing the tail.
    pub(crate) fn refresh_oldest(&self) {
        let oldest = match self.durable.oldest() {
            Some(raw) => self
                .decode_record(&raw)
                .map_or(OLDEST_UNKNOWN, |event| event.timestamp),
            None => OLDEST_UNKNOWN,
        };
        self.oldest_ms.store(oldest, Ordering::Relaxed);
    }

    /// Marks the intake queue as flushed now.
    pub(crate) fn note_flush(&self) {
        self.last_flush_ms.store(now_timestamp(), Ordering::Relaxed);
    }

    /// How long the oldest queued event has been waiting, or zero when the
    /// queue is empty.
    pub(crate) fn dirty_for(&self) -> Duration {
        if self.queue.is_empty() {
            return Duration::ZERO;
        }
        let waited = now_timestamp().saturating_sub(self.last_flush_ms.load(Ordering::Relaxed));
        Duration::from_millis(u64::try_from(waited).unwrap_or(0))
    }

    pub(crate) fn writer_active(&self) -> bool {
        self.writer_active.load(Ordering::SeqCst)
    }

    pub(crate) fn set_writer_active(&self, active: bool) {
        self.writer_active.store(active, Ordering::SeqCst);
    }

    pub(crate) fn note_oversize_drop(&self) {
        self.dropped_oversize.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn oversize_drops(&self) -> u64 {
        self.dropped_oversize.load(Ordering::Relaxed)
    }

    pub(crate) fn note_backpressure_drop(&self) {
        self.dropped_backpressure.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn backpressure_drops(&self) -> u64 {
        self.dropped_backpressure.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use ebb_store::MemoryStore;

    use crate::types::Level;

    use super::*;

    fn core_over(store: MemoryStore) -> Core {
        Core::new(Settings::default().normalized(), Arc::new(store))
    }

    fn encoded(timestamp: i64) -> String {
        codec::encode(&LogEvent::new(Level::Info, "t", "m").with_timestamp(timestamp)).unwrap()
    }

    #[test]
    fn oldest_cache_starts_unknown() {
        let core = core_over(MemoryStore::new());
        assert_eq!(core.cached_oldest(), None);
    }

    #[test]
    fn refresh_reads_the_stored_tail() {
        let core = core_over(MemoryStore::with_records(vec![encoded(111), encoded(222)]));
        core.refresh_oldest();
        assert_eq!(core.cached_oldest(), Some(111));
    }

    #[test]
    fn refresh_on_empty_store_stays_unknown() {
        let core = core_over(MemoryStore::new());
        core.refresh_oldest();
        assert_eq!(core.cached_oldest(), None);
    }

    #[test]
    fn undecodable_tail_leaves_cache_unknown() {
        let core = core_over(MemoryStore::with_records(vec![
            "garbage".to_string(),
            encoded(5),
        ]));
        core.refresh_oldest();
        assert_eq!(core.cached_oldest(), None);
    }

    #[test]
    fn decode_record_skips_garbage_and_keeps_working() {
        let core = core_over(MemoryStore::new());
        assert!(core.decode_record("not json").is_none());
        assert!(core.decode_record("still not json").is_none());
        assert!(core.decode_record(&encoded(9)).is_some());
    }

    #[test]
    fn dirty_for_is_zero_when_queue_is_empty() {
        let core = core_over(MemoryStore::new());
        assert_eq!(core.dirty_for(), Duration::ZERO);
    }

    #[test]
    fn dirty_for_grows_while_events_wait() {
        let core = core_over(MemoryStore::new());
        core.queue
            .try_push(LogEvent::new(Level::Info, "t", "m"))
            .unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert!(core.dirty_for() > Duration::ZERO);
    }

    #[test]
    fn drop_counters_accumulate() {
        let core = core_over(MemoryStore::new());
        core.note_oversize_drop();
        core.note_oversize_drop();
        core.note_backpressure_drop();
        assert_eq!(core.oversize_drops(), 2);
        assert_eq!(core.backpressure_drops(), 1);
    }
}
