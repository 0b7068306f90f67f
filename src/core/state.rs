//! # Shared per-run state.
//!
//! [`RunState`] is the only mutable state shared by workers:
//! - atomic counters, one add per terminal outcome or retry
//! - the abort latch (first writer wins)
//! - the bounded error sample buffer
//! - the per-message error counts (when aggregation is enabled)
//!
//! It is read exactly once, by [`RunState::fill`], after every worker has exited.

use std::mem;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::SystemTime;

use dashmap::DashMap;

use crate::error::TaskError;
use crate::result::{AbortReason, ErrorSample, RunResult};

/// Terminal state of one item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Success,
    Failed,
    Cancelled,
}

/// Atomic tallies for one run.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    success: AtomicUsize,
    failed: AtomicUsize,
    retried: AtomicUsize,
    cancelled: AtomicUsize,
}

impl Counters {
    fn slot(&self, outcome: Outcome) -> &AtomicUsize {
        match outcome {
            Outcome::Success => &self.success,
            Outcome::Failed => &self.failed,
            Outcome::Cancelled => &self.cancelled,
        }
    }
}

/// State shared by all workers of one run.
#[derive(Debug)]
pub(crate) struct RunState {
    counters: Counters,
    abort: OnceLock<AbortReason>,
    samples: Mutex<Vec<ErrorSample>>,
    error_counts: DashMap<String, usize>,
    max_samples: usize,
    aggregate: bool,
}

impl RunState {
    pub fn new(max_samples: usize, aggregate: bool) -> Self {
        Self {
            counters: Counters::default(),
            abort: OnceLock::new(),
            samples: Mutex::new(Vec::new()),
            error_counts: DashMap::new(),
            max_samples,
            aggregate,
        }
    }

    /// Records the terminal outcome of one item.
    pub fn record(&self, outcome: Outcome) {
        self.counters.slot(outcome).fetch_add(1, Ordering::Relaxed);
    }

    /// Records one retry.
    pub fn retry(&self) {
        self.counters.retried.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed attempt in the sample buffer and, if enabled, the counts.
    pub fn record_error(&self, task_id: usize, attempt: u32, err: &TaskError) {
        {
            let mut samples = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
            if samples.len() < self.max_samples {
                samples.push(ErrorSample {
                    error: err.clone(),
                    task_id,
                    attempt,
                    at: SystemTime::now(),
                });
            }
        }
        if self.aggregate {
            *self.error_counts.entry(err.to_string()).or_insert(0) += 1;
        }
    }

    /// Stores the abort reason; returns `false` if one was already stored.
    pub fn abort(&self, reason: AbortReason) -> bool {
        self.abort.set(reason).is_ok()
    }

    /// Copies the final state into `result`.
    pub fn fill(&self, result: &mut RunResult) {
        let c = &self.counters;
        result.success = c.success.load(Ordering::Acquire);
        result.failed = c.failed.load(Ordering::Acquire);
        result.retried = c.retried.load(Ordering::Acquire);
        result.cancelled = c.cancelled.load(Ordering::Acquire);

        if let Some(reason) = self.abort.get() {
            result.aborted = true;
            result.abort_reason = Some(reason.clone());
        }

        let mut samples = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
        result.error_samples = mem::take(&mut *samples);
        result.error_count = self
            .error_counts
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect();
    }
}
