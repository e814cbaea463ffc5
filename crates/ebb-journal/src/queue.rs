//! Bounded in-memory intake queue between writers and the flush thread.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::types::LogEvent;

/// FIFO queue with a hard capacity.
///
/// Producers push through [`IntakeQueue::try_push`] and get the event back
/// when the queue is full; the writer thread drains in batches.
#[derive(Debug)]
pub(crate) struct IntakeQueue {
    events: Mutex<VecDeque<LogEvent>>,
    capacity: usize,
}

impl IntakeQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    /// Appends an event, handing it back if the queue is full.
    pub(crate) fn try_push(&self, event: LogEvent) -> Result<(), LogEvent> {
        let mut guard = self.events.lock();
        if guard.len() >= self.capacity {
            return Err(event);
        }
        guard.push_back(event);
        Ok(())
    }

    /// Removes and returns up to `max` events, oldest first.
    pub(crate) fn drain(&self, max: usize) -> Vec<LogEvent> {
        let mut guard = self.events.lock();
        let take = max.min(guard.len());
        guard.drain(..take).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }
}
