//! # Lifecycle hook trait.
//!
//! Provides [`Hooks`], the extension point for observing a run: logging,
//! metrics, progress bars and so on.
//!
//! ## Call sites
//! ```text
//! run()/run_stream() ──► on_begin(total)
//!   worker, per attempt:
//!       on_before(item, attempt)
//!       [handler]
//!       on_after(item, err, elapsed)
//!       on_error(item, err, attempt)        (failed attempts only)
//! run finished ──► on_end(&result)
//! ```
//!
//! ## Rules
//! - Calls are **synchronous** and happen on the worker that runs the item;
//!   keep them cheap.
//! - `on_before`/`on_after`/`on_error` are called **concurrently** from many workers.
//! - Return values are not interpreted; a panicking hook is caught, logged,
//!   and does not affect the run.
//! - An empty batch gets `on_begin` but no `on_end`.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use tokio_util::sync::CancellationToken;
//! use batchvisor::{Hooks, RunResult, TaskError};
//!
//! #[derive(Default)]
//! struct Failures(AtomicUsize);
//!
//! impl<T> Hooks<T> for Failures {
//!     fn on_error(&self, _ctx: &CancellationToken, _item: &T, _err: &TaskError, _attempt: u32) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//!
//!     fn name(&self) -> &'static str { "failures" }
//! }
//! ```

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::result::RunResult;

/// Observer of run and attempt lifecycle.
///
/// Every method has an empty default, implement only what you need.
/// `ctx` is the run's cancellation token.
pub trait Hooks<T>: Send + Sync + 'static {
    /// The run is starting; `total` is 0 for streams.
    fn on_begin(&self, _ctx: &CancellationToken, _total: usize) {}

    /// An attempt is about to invoke the handler.
    fn on_before(&self, _ctx: &CancellationToken, _item: &T, _attempt: u32) {}

    /// An attempt finished; `err` is `None` on success.
    fn on_after(
        &self,
        _ctx: &CancellationToken,
        _item: &T,
        _err: Option<&TaskError>,
        _elapsed: Duration,
    ) {
    }

    /// An attempt failed (including cancellations and timeouts).
    fn on_error(&self, _ctx: &CancellationToken, _item: &T, _err: &TaskError, _attempt: u32) {}

    /// The run finished and the result is final.
    fn on_end(&self, _ctx: &CancellationToken, _result: &RunResult) {}

    /// Returns the hook name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
