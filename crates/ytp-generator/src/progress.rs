//! Shared run state: the progress counter and the error cell.
//!
//! Both are written by every clip task concurrently and read by the job once
//! all tasks have finished.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::GenerationError;

/// Receives progress percentages in `[0, 100]`.
///
/// Invoked from whichever task reaches a report point, one call at a time.
pub type ProgressSink = Arc<dyn Fn(f64) + Send + Sync>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Run progress counted in half units.
///
/// Each clip contributes two half units (acquired, effects done) and the
/// final concatenation contributes two more. Incrementing and reporting
/// happen under one lock, so reports arrive in non-decreasing order.
pub struct ProgressTracker {
    total: u64,
    done: Mutex<u64>,
    sink: Option<ProgressSink>,
}

impl ProgressTracker {
    /// Tracker for `units` whole units of work.
    pub fn new(units: u64, sink: Option<ProgressSink>) -> Self {
        Self {
            total: units.max(1) * 2,
            done: Mutex::new(0),
            sink,
        }
    }

    /// Record half a unit and report.
    pub fn advance_half(&self) -> f64 {
        let mut done = lock(&self.done);
        *done = (*done + 1).min(self.total);
        self.report(*done)
    }

    /// Jump to completion and report 100, unless already there.
    pub fn finish(&self) -> f64 {
        let mut done = lock(&self.done);
        if *done < self.total {
            *done = self.total;
            self.report(*done);
        }
        100.0
    }

    /// Current percentage.
    pub fn percent(&self) -> f64 {
        self.to_percent(*lock(&self.done))
    }

    fn to_percent(&self, done: u64) -> f64 {
        (done as f64 / self.total as f64 * 100.0).min(100.0)
    }

    /// Called with the counter lock held.
    fn report(&self, done: u64) -> f64 {
        let percent = self.to_percent(done);
        if let Some(sink) = &self.sink {
            sink(percent);
        }
        percent
    }
}

/// One failed clip task, as listed in the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipFailure {
    pub index: u32,
    pub message: String,
}

#[derive(Debug, Default)]
struct ErrorSlots {
    last: Option<GenerationError>,
    failures: Vec<ClipFailure>,
}

/// Last-writer-wins slot for task failures, plus the full failure list.
///
/// When several tasks fail at once, which one ends up in the slot is not
/// determined; the list always holds all of them.
#[derive(Debug, Default)]
pub struct ErrorCell {
    slots: Mutex<ErrorSlots>,
}

impl ErrorCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure of task `index`, replacing the previous last error.
    pub fn record(&self, index: u32, error: GenerationError) {
        let mut slots = lock(&self.slots);
        slots.failures.push(ClipFailure {
            index,
            message: error.to_string(),
        });
        slots.last = Some(error);
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.slots).last.is_none()
    }

    pub fn failure_count(&self) -> usize {
        lock(&self.slots).failures.len()
    }

    /// The last error and every failure, sorted by task index.
    pub fn into_parts(self) -> (Option<GenerationError>, Vec<ClipFailure>) {
        let slots = self
            .slots
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut failures = slots.failures;
        failures.sort_by_key(|f| f.index);
        (slots.last, failures)
    }
}
