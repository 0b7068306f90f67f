//! # Error policies.
//!
//! An [`ErrorPolicy`] decides what happens after a handler attempt fails with an
//! ordinary error (cancellations never reach it):
//!
//! ```text
//! decide(err, item, attempt) ─► ErrorAction::Continue  → task Failed
//!                             ─► ErrorAction::Retry     → backoff, next attempt (up to max_retry)
//!                             ─► ErrorAction::Abort     → task Failed, whole run cancelled
//! ```
//!
//! Any `Fn(&TaskError, &T, u32) -> ErrorAction` closure is a policy. The named
//! types below cover the common cases and compose with [`CombinedPolicy`].
//!
//! ## Concurrency note
//! Policies are shared by all workers and invoked concurrently. [`AbortOnFirstError`]
//! fires exactly once, but tasks already running when it fires may still fail
//! and be reported before the abort reaches them.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::TaskError;

/// Action to take after a failed attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ErrorAction {
    /// Give up on this item and move on.
    #[default]
    Continue,
    /// Attempt the item again.
    Retry,
    /// Stop the whole run.
    Abort,
}

impl fmt::Display for ErrorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorAction::Continue => "Continue",
            ErrorAction::Retry => "Retry",
            ErrorAction::Abort => "Abort",
        })
    }
}

/// Decides how to react to a failed attempt.
///
/// `attempt` is zero-based: `0` is the first execution of the item.
/// A policy that panics ends the item as failed; the run keeps going.
pub trait ErrorPolicy<T>: Send + Sync + 'static {
    /// Returns the action for this failure.
    fn decide(&self, err: &TaskError, item: &T, attempt: u32) -> ErrorAction;
}

impl<T, F> ErrorPolicy<T> for F
where
    F: Fn(&TaskError, &T, u32) -> ErrorAction + Send + Sync + 'static,
{
    fn decide(&self, err: &TaskError, item: &T, attempt: u32) -> ErrorAction {
        self(err, item, attempt)
    }
}

/// Always continues (default).
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysContinue;

impl<T> ErrorPolicy<T> for AlwaysContinue {
    fn decide(&self, _err: &TaskError, _item: &T, _attempt: u32) -> ErrorAction {
        ErrorAction::Continue
    }
}

/// Always retries (bounded by `max_retry`).
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysRetry;

impl<T> ErrorPolicy<T> for AlwaysRetry {
    fn decide(&self, _err: &TaskError, _item: &T, _attempt: u32) -> ErrorAction {
        ErrorAction::Retry
    }
}

/// Retries deadline/timeout errors, continues on everything else.
///
/// Only errors the handler returns itself reach this policy (see
/// [`TaskError::is_timeout`]); the executor's own per-attempt timeout ends the
/// task as cancelled before any policy runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct RetryOnTimeout;

impl<T> ErrorPolicy<T> for RetryOnTimeout {
    fn decide(&self, err: &TaskError, _item: &T, _attempt: u32) -> ErrorAction {
        if err.is_timeout() {
            ErrorAction::Retry
        } else {
            ErrorAction::Continue
        }
    }
}

/// Aborts the run on any error.
#[derive(Clone, Copy, Debug, Default)]
pub struct AbortOnError;

impl<T> ErrorPolicy<T> for AbortOnError {
    fn decide(&self, _err: &TaskError, _item: &T, _attempt: u32) -> ErrorAction {
        ErrorAction::Abort
    }
}

/// Aborts on the first error seen by any worker, continues afterwards.
#[derive(Debug, Default)]
pub struct AbortOnFirstError {
    fired: AtomicBool,
}

impl AbortOnFirstError {
    /// Creates an unfired latch.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T> ErrorPolicy<T> for AbortOnFirstError {
    fn decide(&self, _err: &TaskError, _item: &T, _attempt: u32) -> ErrorAction {
        if self.fired.swap(true, Ordering::AcqRel) {
            ErrorAction::Continue
        } else {
            ErrorAction::Abort
        }
    }
}

/// Retries when the predicate matches, continues otherwise.
pub struct RetryOnCondition<F> {
    predicate: F,
}

impl<F> RetryOnCondition<F>
where
    F: Fn(&TaskError) -> bool + Send + Sync + 'static,
{
    /// Wraps `predicate`.
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<T, F> ErrorPolicy<T> for RetryOnCondition<F>
where
    F: Fn(&TaskError) -> bool + Send + Sync + 'static,
{
    fn decide(&self, err: &TaskError, _item: &T, _attempt: u32) -> ErrorAction {
        if (self.predicate)(err) {
            ErrorAction::Retry
        } else {
            ErrorAction::Continue
        }
    }
}

/// Aborts when the predicate matches, continues otherwise.
pub struct AbortOnCondition<F> {
    predicate: F,
}

impl<F> AbortOnCondition<F>
where
    F: Fn(&TaskError) -> bool + Send + Sync + 'static,
{
    /// Wraps `predicate`.
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<T, F> ErrorPolicy<T> for AbortOnCondition<F>
where
    F: Fn(&TaskError) -> bool + Send + Sync + 'static,
{
    fn decide(&self, err: &TaskError, _item: &T, _attempt: u32) -> ErrorAction {
        if (self.predicate)(err) {
            ErrorAction::Abort
        } else {
            ErrorAction::Continue
        }
    }
}

/// Evaluates policies in order and returns the first non-`Continue` action.
pub struct CombinedPolicy<T> {
    policies: Vec<Arc<dyn ErrorPolicy<T>>>,
}

impl<T: 'static> CombinedPolicy<T> {
    /// Creates an empty combination (always `Continue`).
    pub fn new() -> Self {
        Self {
            policies: Vec::new(),
        }
    }

    /// Appends a policy to the evaluation order.
    pub fn with(mut self, policy: impl ErrorPolicy<T>) -> Self {
        self.policies.push(Arc::new(policy));
        self
    }
}

impl<T: 'static> Default for CombinedPolicy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> From<Vec<Arc<dyn ErrorPolicy<T>>>> for CombinedPolicy<T> {
    fn from(policies: Vec<Arc<dyn ErrorPolicy<T>>>) -> Self {
        Self { policies }
    }
}

impl<T: 'static> ErrorPolicy<T> for CombinedPolicy<T> {
    fn decide(&self, err: &TaskError, item: &T, attempt: u32) -> ErrorAction {
        self.policies
            .iter()
            .map(|p| p.decide(err, item, attempt))
            .find(|action| *action != ErrorAction::Continue)
            .unwrap_or(ErrorAction::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail() -> TaskError {
        TaskError::fail("boom")
    }

    #[test]
    fn test_fixed_policies() {
        assert_eq!(AlwaysContinue.decide(&fail(), &1, 0), ErrorAction::Continue);
        assert_eq!(AlwaysRetry.decide(&fail(), &1, 5), ErrorAction::Retry);
        assert_eq!(AbortOnError.decide(&fail(), &1, 0), ErrorAction::Abort);
    }

    #[test]
    fn test_retry_on_timeout() {
        let p = RetryOnTimeout;
        assert_eq!(
            p.decide(&TaskError::deadline("slow upstream"), &(), 0),
            ErrorAction::Retry
        );
        assert_eq!(p.decide(&fail(), &(), 0), ErrorAction::Continue);
    }

    #[test]
    fn test_abort_on_first_error_fires_once() {
        let p = AbortOnFirstError::new();
        assert_eq!(p.decide(&fail(), &"a", 0), ErrorAction::Abort);
        assert_eq!(p.decide(&fail(), &"b", 0), ErrorAction::Continue);
        assert_eq!(p.decide(&fail(), &"c", 0), ErrorAction::Continue);
    }

    #[test]
    fn test_abort_on_first_error_across_threads() {
        let p = Arc::new(AbortOnFirstError::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let p = Arc::clone(&p);
                std::thread::spawn(move || p.decide(&fail(), &i, 0))
            })
            .collect();
        let aborts = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|a| *a == ErrorAction::Abort)
            .count();
        assert_eq!(aborts, 1);
    }

    #[test]
    fn test_conditions() {
        let retry = RetryOnCondition::new(|e: &TaskError| e.to_string().contains("again"));
        assert_eq!(
            retry.decide(&TaskError::fail("try again"), &0u8, 0),
            ErrorAction::Retry
        );
        assert_eq!(retry.decide(&fail(), &0u8, 0), ErrorAction::Continue);

        let abort = AbortOnCondition::new(|e: &TaskError| e.is_panic());
        let panic = TaskError::Panic {
            message: "x".into(),
            backtrace: String::new(),
        };
        assert_eq!(abort.decide(&panic, &0u8, 0), ErrorAction::Abort);
        assert_eq!(abort.decide(&fail(), &0u8, 0), ErrorAction::Continue);
    }

    #[test]
    fn test_combined_first_non_continue_wins() {
        let combined = CombinedPolicy::<u32>::new()
            .with(AlwaysContinue)
            .with(RetryOnTimeout)
            .with(AbortOnError);

        assert_eq!(
            combined.decide(&TaskError::deadline("slow"), &1, 0),
            ErrorAction::Retry
        );
        assert_eq!(combined.decide(&fail(), &1, 0), ErrorAction::Abort);
        assert_eq!(CombinedPolicy::<u32>::new().decide(&fail(), &1, 0), ErrorAction::Continue);
    }

    #[test]
    fn test_closure_is_a_policy() {
        let by_item = |_e: &TaskError, item: &u32, attempt: u32| {
            if *item % 2 == 0 && attempt < 1 {
                ErrorAction::Retry
            } else {
                ErrorAction::Continue
            }
        };
        let combined = CombinedPolicy::new().with(by_item);
        assert_eq!(combined.decide(&fail(), &4, 0), ErrorAction::Retry);
        assert_eq!(combined.decide(&fail(), &4, 1), ErrorAction::Continue);
        assert_eq!(combined.decide(&fail(), &3, 0), ErrorAction::Continue);
    }

    #[test]
    fn test_action_display() {
        assert_eq!(ErrorAction::Continue.to_string(), "Continue");
        assert_eq!(ErrorAction::Retry.to_string(), "Retry");
        assert_eq!(ErrorAction::Abort.to_string(), "Abort");
    }
}
