//! Retry, error and panic policies.
//!
//! This module groups the knobs that decide **what happens after a failure** and
//! **how long to wait** before trying again.
//!
//! ## Contents
//! - [`ErrorPolicy`] continue / retry / abort after a failed attempt
//! - [`PanicPolicy`] continue / abort after a caught panic
//! - [`BackoffPolicy`] attempt → delay mapping (constant / linear / exponential / fibonacci)
//! - [`JitterPolicy`] randomization on top of the backoff delay
//!
//! ## Quick wiring
//! ```text
//! Config { error_policy, panic_policy, backoff, jitter, max_retry }
//!      └─► core::worker::Worker uses:
//!           - panic_policy to decide whether a caught panic aborts the run
//!           - error_policy to decide continue/retry/abort
//!           - jitter.apply(backoff.delay(attempt)) before each retry
//! ```
//!
//! ## Defaults
//! - [`AlwaysContinue`] for errors, [`PanicAsAbort`] for panics.
//! - No backoff (retries run immediately), [`JitterPolicy::None`].

mod backoff;
mod error;
mod jitter;
mod panic;

pub use backoff::BackoffPolicy;
pub use error::{
    AbortOnCondition, AbortOnError, AbortOnFirstError, AlwaysContinue, AlwaysRetry,
    CombinedPolicy, ErrorAction, ErrorPolicy, RetryOnCondition, RetryOnTimeout,
};
pub use jitter::JitterPolicy;
pub use panic::{PanicAction, PanicAsAbort, PanicAsContinue, PanicPolicy};
