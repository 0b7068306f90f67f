//! Error types used by the executor and by handlers.
//!
//! This module defines three enums:
//!
//! - [`ConfigError`]: a [`Config`](crate::Config) failed validation.
//! - [`ExecutorError`]: setup-time failures returned by [`Executor`](crate::Executor).
//! - [`TaskError`]: failures of a single handler attempt.
//!
//! All of them provide `as_label` for logs/metrics. Handler failures never escape
//! `run`/`run_stream` as errors; they are folded into [`RunResult`](crate::RunResult).

use std::any::Any;
use std::fmt::Display;
use std::time::Duration;

use thiserror::Error;

/// # Invalid executor configuration.
///
/// Raised by [`Config::validate`](crate::Config::validate) and surfaced from
/// [`Executor::new`](crate::Executor::new), never from a later call.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Worker count must be at least one.
    #[error("concurrency must be > 0, got {got}")]
    InvalidConcurrency {
        /// The rejected value.
        got: usize,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::InvalidConcurrency { .. } => "config_invalid_concurrency",
        }
    }
}

/// # Errors produced by the executor itself.
///
/// These are setup failures. Steady-state task failures are reported through
/// the run result, not through this type.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// `run`/`run_stream` was called on an executor that already ran once.
    #[error("executor already used; create a new one")]
    AlreadyUsed,

    /// The configuration was rejected at construction.
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
}

impl ExecutorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use batchvisor::ExecutorError;
    ///
    /// assert_eq!(ExecutorError::AlreadyUsed.as_label(), "executor_already_used");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ExecutorError::AlreadyUsed => "executor_already_used",
            ExecutorError::Config(e) => e.as_label(),
        }
    }
}

/// # Errors produced by one handler attempt.
///
/// Handlers return [`TaskError::Fail`] (or [`TaskError::Deadline`] for their own
/// timeouts) and [`TaskError::Canceled`] when they observe cancellation.
/// The executor itself produces [`TaskError::Timeout`] and [`TaskError::Panic`].
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The attempt exceeded the executor's per-attempt timeout.
    #[error("task timeout after {timeout:?}")]
    Timeout {
        /// The configured attempt timeout.
        timeout: Duration,
    },

    /// The handler gave up waiting on something it depends on.
    #[error("deadline exceeded: {error}")]
    Deadline {
        /// The underlying error message.
        error: String,
    },

    /// The handler failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The handler panicked; the panic was caught at the invocation site.
    #[error("panic: {message}")]
    Panic {
        /// Panic payload rendered as text.
        message: String,
        /// Backtrace captured at the panic site (at the catch site if the panic
        /// hook was replaced).
        backtrace: String,
    },

    /// The run was cancelled while the attempt was in flight.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    ///
    /// Accepts anything printable, so it slots into `map_err`:
    /// ```
    /// use batchvisor::TaskError;
    ///
    /// let res: Result<u8, TaskError> = "300".parse::<u8>().map_err(TaskError::fail);
    /// assert_eq!(res.unwrap_err().as_label(), "task_failed");
    /// ```
    pub fn fail(error: impl Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Shorthand for [`TaskError::Deadline`].
    pub fn deadline(error: impl Display) -> Self {
        TaskError::Deadline {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use batchvisor::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Deadline { .. } => "task_deadline",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panic { .. } => "task_panicked",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::Deadline { error } => format!("deadline: {error}"),
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Panic { message, .. } => format!("panic: {message}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }

    /// Reports whether the error ends the task as cancelled rather than failed.
    ///
    /// True for [`TaskError::Canceled`] and the executor's own [`TaskError::Timeout`].
    /// Such errors never consume a retry and never reach the error policy.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TaskError::Canceled | TaskError::Timeout { .. })
    }

    /// Reports whether the error represents a deadline/timeout condition.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TaskError::Timeout { .. } | TaskError::Deadline { .. })
    }

    /// Reports whether the error was converted from a handler panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, TaskError::Panic { .. })
    }
}

/// Renders a caught panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_covers_canceled_and_timeout() {
        assert!(TaskError::Canceled.is_cancellation());
        assert!(
            TaskError::Timeout {
                timeout: Duration::from_millis(5)
            }
            .is_cancellation()
        );
        assert!(!TaskError::deadline("upstream slow").is_cancellation());
        assert!(!TaskError::fail("boom").is_cancellation());
    }

    #[test]
    fn test_timeout_covers_deadline() {
        assert!(TaskError::deadline("upstream slow").is_timeout());
        assert!(!TaskError::fail("boom").is_timeout());
        assert!(!TaskError::Canceled.is_timeout());
    }

    #[test]
    fn test_panic_display_omits_backtrace() {
        let err = TaskError::Panic {
            message: "index out of bounds".into(),
            backtrace: "frame 0\nframe 1".into(),
        };
        assert_eq!(err.to_string(), "panic: index out of bounds");
        assert!(err.is_panic());
    }

    #[test]
    fn test_config_error_wraps_into_executor_error() {
        let err: ExecutorError = ConfigError::InvalidConcurrency { got: 0 }.into();
        assert_eq!(err.as_label(), "config_invalid_concurrency");
        assert_eq!(err.to_string(), "invalid config: concurrency must be > 0, got 0");
    }

    #[test]
    fn test_panic_message_downcasts() {
        let s: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(&*s), "static str");

        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*owned), "owned");

        let other: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(&*other), "unknown panic");
    }
}
