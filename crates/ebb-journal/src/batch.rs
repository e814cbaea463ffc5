//! Adaptive write batch sizing.
//!
//! This module provides:
//! - [`BatchSizeCalculator`] — feedback controller that tunes the writer's
//!   per-cycle batch size toward a wall-clock goal

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Smallest batch the calculator will recommend.
const MIN_BATCH: usize = 5;

/// Starting batch size before any cycle has been measured.
const INITIAL_BATCH: usize = 2_049;

/// Target duration for one write cycle.
const GOAL: Duration = Duration::from_millis(100);

/// Sentinel for "no cycle measured yet".
const NO_DURATION: u64 = u64::MAX;

/// Tunes the write batch size from observed cycle durations.
///
/// Cycles finishing under half the goal grow the batch by a tenth; cycles
/// over the goal shrink it by a fifth; anything in between holds. The size
/// stays clamped between [`MIN_BATCH`] and the ceiling given at
/// construction. Shrink steps are larger than growth steps, so a store that
/// slows down sheds batch size faster than it regained it.
///
/// All methods take `&self`; the writer thread records durations while other
/// threads read the current size.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use ebb_journal::BatchSizeCalculator;
///
/// let calc = BatchSizeCalculator::new(1_000);
/// let before = calc.size();
/// calc.record_duration(Duration::from_millis(400));
/// assert!(calc.size() < before);
/// ```
#[derive(Debug)]
pub struct BatchSizeCalculator {
    floor: usize,
    ceiling: usize,
    goal: Duration,
    size: AtomicUsize,
    last_duration_ms: AtomicU64,
}

impl BatchSizeCalculator {
    /// Creates a calculator bounded above by `ceiling`.
    ///
    /// A ceiling of zero is treated as one. Ceilings below [`MIN_BATCH`]
    /// lower the floor to match, so tiny queues still get a usable batch.
    #[must_use]
    pub fn new(ceiling: usize) -> Self {
        let ceiling = ceiling.max(1);
        let floor = MIN_BATCH.min(ceiling);
        Self {
            floor,
            ceiling,
            goal: GOAL,
            size: AtomicUsize::new(INITIAL_BATCH.clamp(floor, ceiling)),
            last_duration_ms: AtomicU64::new(NO_DURATION),
        }
    }

    /// Current recommended batch size.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    /// Duration of the most recently recorded cycle, if any.
    #[must_use]
    pub fn last_duration(&self) -> Option<Duration> {
        match self.last_duration_ms.load(Ordering::Relaxed) {
            NO_DURATION => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Feeds one observed cycle duration into the controller.
    pub fn record_duration(&self, observed: Duration) {
        let observed_ms = u64::try_from(observed.as_millis()).unwrap_or(NO_DURATION - 1);
        self.last_duration_ms.store(observed_ms, Ordering::Relaxed);

        let current = self.size.load(Ordering::Relaxed);
        let next = if observed < self.goal / 2 {
            current.saturating_add(current / 10 + 1)
        } else if observed > self.goal {
            current.saturating_sub(current / 5 + 1)
        } else {
            current
        };
        self.size
            .store(next.clamp(self.floor, self.ceiling), Ordering::Relaxed);
    }
}
