//! # Executor configuration.
//!
//! Provides [`Config`], the settings consumed by [`Executor::new`](crate::Executor::new).
//!
//! A config goes through two steps at construction:
//! 1. [`Config::validate`] rejects impossible settings (fatal to construction)
//! 2. [`Config::set_defaults`] fills unset fields
//!
//! ## Sentinel values
//! - `timeout = 0s` → no per-attempt timeout
//! - `max_error_samples = 0` → replaced by the default (100)
//! - `error_policy = None` → [`AlwaysContinue`]
//! - `panic_policy = None` → [`PanicAsAbort`]
//! - `backoff = None` → retries run immediately
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use batchvisor::{AlwaysRetry, BackoffPolicy, Config, JitterPolicy};
//!
//! let cfg = Config::<String>::new(8)
//!     .with_name("uploader")
//!     .with_timeout(Duration::from_secs(30))
//!     .with_max_retry(3)
//!     .with_backoff(BackoffPolicy::Exponential {
//!         base: Duration::from_millis(200),
//!         max: Duration::from_secs(5),
//!     })
//!     .with_jitter(JitterPolicy::Equal)
//!     .with_error_policy(AlwaysRetry)
//!     .with_error_aggregation(true);
//!
//! assert!(cfg.validate().is_ok());
//! assert_eq!(cfg.queue_capacity(), 16);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ConfigError;
use crate::hooks::Hooks;
use crate::policies::{
    AlwaysContinue, BackoffPolicy, ErrorPolicy, JitterPolicy, PanicAsAbort, PanicPolicy,
};

/// Default cap on stored error samples.
pub const DEFAULT_MAX_ERROR_SAMPLES: usize = 100;

/// Default executor name used in logs.
pub const DEFAULT_NAME: &str = "executor";

/// Work channel capacity per worker.
const QUEUE_SLOTS_PER_WORKER: usize = 2;

/// Executor configuration.
///
/// ## Field semantics
/// - `concurrency`: number of workers (must be `> 0`)
/// - `timeout`: per-attempt timeout (`0s` = none)
/// - `max_retry`: retries per item on top of the first attempt
/// - `backoff` / `jitter`: delay before each retry
/// - `error_policy` / `panic_policy`: failure handling
/// - `max_error_samples`: how many failures are kept verbatim
/// - `error_aggregation`: count failures per error message
/// - `hooks`: lifecycle observers
///
/// All fields are public; the `with_*` methods are shorthand.
pub struct Config<T> {
    /// Identifies this executor in logs.
    pub name: String,

    /// Number of concurrent workers.
    pub concurrency: usize,

    /// Per-attempt timeout.
    ///
    /// - `Duration::ZERO` = no timeout
    /// - `> 0` = the attempt's token is cancelled and the task ends as cancelled
    pub timeout: Duration,

    /// Maximum number of retries per item (`0` = no retries).
    pub max_retry: u32,

    /// Delay before each retry (`None` = retry immediately).
    pub backoff: Option<BackoffPolicy>,

    /// Randomization applied on top of `backoff`.
    pub jitter: JitterPolicy,

    /// Decides continue/retry/abort after a failed attempt.
    pub error_policy: Option<Arc<dyn ErrorPolicy<T>>>,

    /// Decides continue/abort after a handler panic.
    pub panic_policy: Option<Arc<dyn PanicPolicy<T>>>,

    /// Maximum number of error samples kept in the result.
    pub max_error_samples: usize,

    /// Whether to count failures per error message.
    pub error_aggregation: bool,

    /// Lifecycle observers, called in order.
    pub hooks: Vec<Arc<dyn Hooks<T>>>,
}

impl<T> Config<T> {
    /// Creates a config with `concurrency` workers and defaults everywhere else.
    pub fn new(concurrency: usize) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            concurrency,
            timeout: Duration::ZERO,
            max_retry: 0,
            backoff: None,
            jitter: JitterPolicy::None,
            error_policy: None,
            panic_policy: None,
            max_error_samples: DEFAULT_MAX_ERROR_SAMPLES,
            error_aggregation: false,
            hooks: Vec::new(),
        }
    }

    /// Checks that the configuration can drive an executor.
    ///
    /// Retry count and timeout cannot be negative by construction, so only the
    /// worker count is checked here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency {
                got: self.concurrency,
            });
        }
        Ok(())
    }

    /// Fills unset fields with their defaults.
    pub fn set_defaults(&mut self)
    where
        T: 'static,
    {
        if self.name.is_empty() {
            self.name = DEFAULT_NAME.to_string();
        }
        if self.error_policy.is_none() {
            self.error_policy = Some(Arc::new(AlwaysContinue));
        }
        if self.panic_policy.is_none() {
            self.panic_policy = Some(Arc::new(PanicAsAbort));
        }
        if self.max_error_samples == 0 {
            self.max_error_samples = DEFAULT_MAX_ERROR_SAMPLES;
        }
    }

    /// Returns the per-attempt timeout as an `Option`.
    ///
    /// - `None` → no timeout
    /// - `Some(d)` → timeout applied per attempt
    #[inline]
    pub fn attempt_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns the capacity of the feeder → worker channel (two slots per worker).
    #[inline]
    pub fn queue_capacity(&self) -> usize {
        self.concurrency.max(1).saturating_mul(QUEUE_SLOTS_PER_WORKER)
    }

    /// Returns a config with the given name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns a config with the given per-attempt timeout (`0s` = none).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns a config with the given retry cap.
    pub fn with_max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = max_retry;
        self
    }

    /// Returns a config with the given backoff.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = Some(backoff);
        self
    }

    /// Returns a config with the given jitter.
    pub fn with_jitter(mut self, jitter: JitterPolicy) -> Self {
        self.jitter = jitter;
        self
    }

    /// Returns a config with the given error policy.
    pub fn with_error_policy(mut self, policy: impl ErrorPolicy<T>) -> Self {
        self.error_policy = Some(Arc::new(policy));
        self
    }

    /// Returns a config with the given panic policy.
    pub fn with_panic_policy(mut self, policy: impl PanicPolicy<T>) -> Self {
        self.panic_policy = Some(Arc::new(policy));
        self
    }

    /// Returns a config with the given sample cap.
    pub fn with_max_error_samples(mut self, max: usize) -> Self {
        self.max_error_samples = max;
        self
    }

    /// Returns a config with error aggregation switched on or off.
    pub fn with_error_aggregation(mut self, enabled: bool) -> Self {
        self.error_aggregation = enabled;
        self
    }

    /// Returns a config with one more hook appended.
    pub fn with_hooks(mut self, hooks: impl Hooks<T>) -> Self {
        self.hooks.push(Arc::new(hooks));
        self
    }
}

impl<T> Default for Config<T> {
    /// One worker per available CPU (at least one), everything else default.
    fn default() -> Self {
        let workers = std::thread::available_parallelism().map_or(1, usize::from);
        Self::new(workers)
    }
}

impl<T> Clone for Config<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            concurrency: self.concurrency,
            timeout: self.timeout,
            max_retry: self.max_retry,
            backoff: self.backoff.clone(),
            jitter: self.jitter,
            error_policy: self.error_policy.clone(),
            panic_policy: self.panic_policy.clone(),
            max_error_samples: self.max_error_samples,
            error_aggregation: self.error_aggregation,
            hooks: self.hooks.clone(),
        }
    }
}

impl<T> fmt::Debug for Config<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("name", &self.name)
            .field("concurrency", &self.concurrency)
            .field("timeout", &self.timeout)
            .field("max_retry", &self.max_retry)
            .field("backoff", &self.backoff)
            .field("jitter", &self.jitter)
            .field("error_policy", &self.error_policy.is_some())
            .field("panic_policy", &self.panic_policy.is_some())
            .field("max_error_samples", &self.max_error_samples)
            .field("error_aggregation", &self.error_aggregation)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::policies::{AlwaysRetry, ErrorAction, PanicAction};

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let cfg = Config::<u32>::new(0);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvalidConcurrency { got: 0 })
        );
        assert!(Config::<u32>::new(1).validate().is_ok());
    }

    #[test]
    fn test_default_is_valid() {
        let cfg = Config::<u32>::default();
        assert!(cfg.concurrency >= 1);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.max_error_samples, DEFAULT_MAX_ERROR_SAMPLES);
    }

    #[test]
    fn test_set_defaults_fills_unset_fields() {
        let mut cfg = Config::<u32>::new(2).with_name("").with_max_error_samples(0);
        cfg.set_defaults();

        assert_eq!(cfg.name, DEFAULT_NAME);
        assert_eq!(cfg.max_error_samples, DEFAULT_MAX_ERROR_SAMPLES);

        let err = TaskError::fail("x");
        let ep = cfg.error_policy.as_ref().unwrap();
        assert_eq!(ep.decide(&err, &1, 0), ErrorAction::Continue);

        let pp = cfg.panic_policy.as_ref().unwrap();
        assert_eq!(pp.decide(&"boom", &1, 0), PanicAction::Abort);
    }

    #[test]
    fn test_set_defaults_keeps_explicit_values() {
        let mut cfg = Config::<u32>::new(2)
            .with_error_policy(AlwaysRetry)
            .with_max_error_samples(5);
        cfg.set_defaults();

        assert_eq!(cfg.max_error_samples, 5);
        let ep = cfg.error_policy.as_ref().unwrap();
        assert_eq!(ep.decide(&TaskError::fail("x"), &1, 0), ErrorAction::Retry);
    }

    #[test]
    fn test_attempt_timeout_sentinel() {
        let cfg = Config::<u32>::new(1);
        assert_eq!(cfg.attempt_timeout(), None);

        let cfg = cfg.with_timeout(Duration::from_millis(250));
        assert_eq!(cfg.attempt_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_queue_capacity_is_twice_concurrency() {
        assert_eq!(Config::<u32>::new(3).queue_capacity(), 6);
        assert_eq!(Config::<u32>::new(1).queue_capacity(), 2);
    }
}
