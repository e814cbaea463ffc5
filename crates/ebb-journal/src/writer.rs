//! Background writer: drains the intake queue and enforces retention.
//!
//! This module provides:
//! - [`spawn`] — starts the writer thread for an open journal
//! - [`flush_queue`] — one queue-to-store drain step, shared with close
//!
//! The writer owns all mutation of the durable store while the journal is
//! open; producers only touch the intake queue.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{debug, error, trace};

use crate::codec::{self, MAX_ENCODED_LEN};
use crate::state::Core;
use crate::status::Status;
use crate::types::now_timestamp;

/// Cycles doing less total work than this sleep instead of looping again.
pub(crate) const WORK_TRICKLE: usize = 5;

/// Starts the writer thread.
///
/// The thread runs until the journal's status leaves `Open` and is never
/// joined; close waits for it through the shared activity flag instead.
pub(crate) fn spawn(core: Arc<Core>) -> std::io::Result<()> {
    thread::Builder::new()
        .name("ebb-journal-writer".to_string())
        .spawn(move || run(&core))?;
    Ok(())
}

fn run(core: &Core) {
    core.set_writer_active(true);
    debug!("writer loop started");

    while core.status.load() == Status::Open {
        let cycle_start = Instant::now();
        let flushed = flush_queue(core);
        let purged = purge_cycle(core);

        if flushed + purged < WORK_TRICKLE {
            thread::sleep(core.settings.flush_idle_interval);
        } else {
            let elapsed = cycle_start.elapsed();
            core.calculator.record_duration(elapsed);
            if core.settings.debug {
                trace!(
                    flushed,
                    purged,
                    pending = core.queue.len(),
                    batch_size = core.calculator.size(),
                    elapsed_ms = elapsed.as_millis(),
                    "writer cycle complete"
                );
            }
        }
    }

    debug!("writer loop exiting");
    core.set_writer_active(false);
}

/// Drains one batch from the intake queue into the durable store.
///
/// Returns how many events came off the queue, counting events that were
/// dropped instead of written.
pub(crate) fn flush_queue(core: &Core) -> usize {
    let drained = core.queue.drain(core.calculator.size());
    if drained.is_empty() {
        return 0;
    }

    let mut records = Vec::with_capacity(drained.len());
    for event in &drained {
        match codec::encode(event) {
            Ok(record) if record.len() > MAX_ENCODED_LEN => {
                core.note_oversize_drop();
                trace!(
                    len = record.len(),
                    topic = %event.topic,
                    "dropping event larger than the encoded record limit"
                );
            }
            Ok(record) => records.push(record),
            Err(err) => error!(error = %err, "failed to encode event, dropping it"),
        }
    }

    if !records.is_empty() {
        let had_no_oldest = core.cached_oldest().is_none();
        match core.durable.append(&records) {
            Ok(()) => {
                // After a first append into an empty store the oldest record
                // is knowable without the removal probe.
                if had_no_oldest {
                    core.refresh_oldest();
                }
            }
            Err(err) => error!(
                count = records.len(),
                error = %err,
                "failed to append event batch, events lost"
            ),
        }
    }

    core.note_flush();
    drained.len()
}

/// Runs one retention pass, returning how many records were removed.
fn purge_cycle(core: &Core) -> usize {
    let requested = tail_removal_count(core);
    if requested == 0 {
        return 0;
    }

    // Never remove more than slightly over one batch per cycle.
    let capped = requested.min(core.calculator.size() + 1);
    match core.durable.remove_oldest(capped) {
        Ok(removed) => {
            core.refresh_oldest();
            removed
        }
        Err(err) => {
            error!(error = %err, "failed to remove oldest records");
            core.refresh_oldest();
            0
        }
    }
}

/// Decides how many records retention should remove this cycle.
///
/// A store holding one record or fewer is never purged, so retention can
/// shrink the journal but never empty it.
fn tail_removal_count(core: &Core) -> usize {
    let stored = core.durable.len();
    if stored <= 1 {
        return 0;
    }

    let max_events = core.settings.max_events;
    if stored > max_events {
        return stored - max_events;
    }

    let Some(oldest_ms) = core.cached_oldest() else {
        // Unknown tail: remove one record to get past whatever is there.
        return 1;
    };

    let max_age = core.settings.max_age;
    if !max_age.is_zero() {
        let age_ms = now_timestamp().saturating_sub(oldest_ms);
        let expired = u128::try_from(age_ms).is_ok_and(|age| age > max_age.as_millis());
        if expired {
            let policy = core.settings.purge_policy;
            return if stored > policy.backlog_threshold {
                policy.batch_size
            } else {
                policy.step_size
            };
        }
    }

    0
}
