//! # Run result and error records.
//!
//! [`RunResult`] is the aggregate outcome of one executor run. It is assembled
//! once, after every worker has exited, and never touched by the executor again.
//!
//! ## Accounting
//! ```text
//! total ≥ success + failed + cancelled
//!         (equal unless an abort stopped the feeder before every item was queued)
//! retried = number of extra attempts across all items
//! ```

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use crate::error::TaskError;

/// One recorded failure.
///
/// The executor keeps the first `max_error_samples` of these, in the order
/// they were recorded.
#[derive(Clone, Debug)]
pub struct ErrorSample {
    /// The error of the failed attempt.
    pub error: TaskError,
    /// Sequential id of the item.
    pub task_id: usize,
    /// Zero-based attempt that failed.
    pub attempt: u32,
    /// When the failure was recorded.
    pub at: SystemTime,
}

/// The failure that stopped the run.
#[derive(Clone, Debug)]
pub struct AbortReason {
    /// Sequential id of the item whose failure triggered the abort.
    pub task_id: usize,
    /// Zero-based attempt that triggered the abort.
    pub attempt: u32,
    /// The triggering error.
    pub error: TaskError,
    /// When the abort was triggered.
    pub at: SystemTime,
}

/// Execution statistics for one run.
#[derive(Clone, Debug)]
pub struct RunResult {
    /// Items in the batch, or items pulled from the stream.
    pub total: usize,
    /// Items that eventually succeeded.
    pub success: usize,
    /// Items that ended with an error.
    pub failed: usize,
    /// Retry attempts across all items.
    pub retried: usize,
    /// Items stopped by cancellation or per-attempt timeout.
    pub cancelled: usize,

    /// Whether a policy aborted the run.
    pub aborted: bool,
    /// Details of the abort, if any.
    pub abort_reason: Option<AbortReason>,

    /// Wall-clock start of the run.
    pub started_at: SystemTime,
    /// Wall-clock end of the run.
    pub ended_at: SystemTime,

    /// Bounded, first-come sample of failures.
    pub error_samples: Vec<ErrorSample>,
    /// Failure count per error message (empty unless aggregation is enabled).
    pub error_count: HashMap<String, usize>,
}

impl RunResult {
    /// Creates the shell of a run that starts now.
    pub(crate) fn started(total: usize) -> Self {
        let now = SystemTime::now();
        Self {
            total,
            success: 0,
            failed: 0,
            retried: 0,
            cancelled: 0,
            aborted: false,
            abort_reason: None,
            started_at: now,
            ended_at: now,
            error_samples: Vec::new(),
            error_count: HashMap::new(),
        }
    }

    /// Returns the wall-clock duration of the run.
    ///
    /// Zero if the system clock moved backwards during the run.
    pub fn duration(&self) -> Duration {
        self.ended_at
            .duration_since(self.started_at)
            .unwrap_or(Duration::ZERO)
    }

    /// Reports whether any item failed or the run was aborted.
    pub fn has_errors(&self) -> bool {
        self.failed > 0 || self.aborted
    }

    /// Returns the success rate as a percentage (0-100); 0 for an empty run.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.success as f64 / self.total as f64 * 100.0
    }

    /// Reports whether every item reached a terminal state.
    ///
    /// May be false after an abort: items the feeder never queued are not
    /// counted anywhere.
    pub fn is_complete(&self) -> bool {
        self.success + self.failed + self.cancelled == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let mut r = RunResult::started(0);
        assert_eq!(r.success_rate(), 0.0);

        r.total = 8;
        r.success = 6;
        assert_eq!(r.success_rate(), 75.0);
    }

    #[test]
    fn test_is_complete_and_has_errors() {
        let mut r = RunResult::started(10);
        r.success = 7;
        r.failed = 2;
        assert!(!r.is_complete());
        assert!(r.has_errors());

        r.cancelled = 1;
        assert!(r.is_complete());

        let mut clean = RunResult::started(1);
        clean.success = 1;
        assert!(!clean.has_errors());
        clean.aborted = true;
        assert!(clean.has_errors());
    }

    #[test]
    fn test_duration() {
        let mut r = RunResult::started(1);
        r.ended_at = r.started_at + Duration::from_millis(1500);
        assert_eq!(r.duration(), Duration::from_millis(1500));

        r.ended_at = r.started_at - Duration::from_secs(1);
        assert_eq!(r.duration(), Duration::ZERO);
    }
}
