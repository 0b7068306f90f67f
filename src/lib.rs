//! # batchvisor
//!
//! **Batchvisor** is a bounded-concurrency executor for async work items.
//!
//! It runs a batch (or a stream) of items through a user-supplied handler with
//! per-item retry and backoff, configurable error and panic policies,
//! cooperative cancellation/abort, and aggregated execution statistics. The
//! executor knows nothing about what the handler does.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   Vec<T> / mpsc::Receiver<T>
//!              │
//!              ▼
//!     ┌──────────────────┐      ┌──────────────────────────────┐
//!     │      Feeder      │ ───► │ bounded mpsc (2 × workers)   │
//!     │ (ids 0, 1, 2, …) │      └──────────────┬───────────────┘
//!     └──────────────────┘          ┌──────────┼──────────┐
//!                                   ▼          ▼          ▼
//!                               worker 1   worker 2   worker N      (JoinSet)
//!                                   │          │          │
//!                                   ▼          ▼          ▼
//!                         run_once(handler, item)  timeout + catch_unwind
//!                                   │
//!                         ErrorPolicy / PanicPolicy ──► continue / retry / abort
//!                                   │
//!                                   ▼
//!   ┌───────────────────────────────────────────────────────────────────┐
//!   │ RunState: atomic counters · abort latch · error samples · counts  │
//!   └─────────────────────────────────┬─────────────────────────────────┘
//!                                     ▼
//!                                 RunResult
//! ```
//!
//! ### Item lifecycle
//! ```text
//! loop {
//!   ├─► run cancelled? ─► Cancelled
//!   ├─► on_before(item, attempt)
//!   ├─► run_once() ─────► handler.handle(child_token, &item)
//!   ├─► on_after(item, err, elapsed)
//!   ├─ Ok  ──► Success
//!   └─ Err ──► on_error(item, err, attempt)
//!              ├─ Canceled / attempt timeout ─► Cancelled
//!              └─ ErrorPolicy:
//!                   ├─ Continue ─► Failed
//!                   ├─ Abort    ─► Failed, latch reason, cancel run
//!                   └─ Retry    ─► Failed if attempt >= max_retry,
//!                                  else sleep(jitter(backoff(attempt + 1)))
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                             | Key types / traits                          |
//! |-------------------|---------------------------------------------------------|---------------------------------------------|
//! | **Execution**     | One-shot batch or stream run with bounded concurrency.  | [`Executor`]                                |
//! | **Handlers**      | Item processors as trait objects or closures.           | [`Handler`], [`HandlerFn`], [`HandlerRef`]  |
//! | **Policies**      | Error/panic handling, retry delays and jitter.          | [`ErrorPolicy`], [`PanicPolicy`], [`BackoffPolicy`], [`JitterPolicy`] |
//! | **Hooks**         | Observe run and attempt lifecycle.                      | [`Hooks`]                                   |
//! | **Results**       | Counters, abort reason, error samples and counts.       | [`RunResult`], [`ErrorSample`], [`AbortReason`] |
//! | **Errors**        | Typed setup and task errors.                            | [`ExecutorError`], [`TaskError`]            |
//! | **Configuration** | Per-executor settings.                                  | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] hook _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use batchvisor::{AlwaysRetry, BackoffPolicy, Config, Executor, HandlerFn, TaskError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::<u64>::new(4)
//!         .with_max_retry(2)
//!         .with_error_policy(AlwaysRetry)
//!         .with_backoff(BackoffPolicy::Exponential {
//!             base: Duration::from_millis(5),
//!             max: Duration::from_millis(50),
//!         });
//!     let exec = Executor::new(cfg)?;
//!
//!     // Multiples of 7 always fail.
//!     let handler = HandlerFn::arc("check", |_ctx: CancellationToken, n: u64| async move {
//!         if n % 7 == 0 {
//!             return Err(TaskError::fail(format!("{n} is unlucky")));
//!         }
//!         Ok(())
//!     });
//!
//!     let res = exec.run(&CancellationToken::new(), (1..=20).collect(), handler).await?;
//!     assert_eq!(res.success, 18);
//!     assert_eq!(res.failed, 2);
//!     assert_eq!(res.retried, 4);
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod hooks;
mod policies;
mod result;
mod tasks;

// ---- Public re-exports ----

pub use config::{Config, DEFAULT_MAX_ERROR_SAMPLES, DEFAULT_NAME};
pub use core::Executor;
pub use error::{ConfigError, ExecutorError, TaskError};
pub use hooks::Hooks;
pub use policies::{
    AbortOnCondition, AbortOnError, AbortOnFirstError, AlwaysContinue, AlwaysRetry,
    BackoffPolicy, CombinedPolicy, ErrorAction, ErrorPolicy, JitterPolicy, PanicAction,
    PanicAsAbort, PanicAsContinue, PanicPolicy, RetryOnCondition, RetryOnTimeout,
};
pub use result::{AbortReason, ErrorSample, RunResult};
pub use tasks::{Handler, HandlerFn, HandlerRef};

// Optional: expose a simple built-in logger hook (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use hooks::LogWriter;
