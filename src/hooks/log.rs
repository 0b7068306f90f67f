//! # LogWriter: tracing-backed lifecycle logger
//!
//! A minimal [`Hooks`] implementation that reports every lifecycle call through
//! [`tracing`]. Use it for tests, demos, or as a template for real telemetry.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO  batchvisor::hooks::log: [begin] total=100
//! DEBUG batchvisor::hooks::log: [before] attempt=0
//! DEBUG batchvisor::hooks::log: [after] ok=false elapsed=1.2ms
//! WARN  batchvisor::hooks::log: [error] attempt=0 err=execution failed: connection refused
//! INFO  batchvisor::hooks::log: [end] total=100 success=97 failed=3 cancelled=0 retried=6 aborted=false
//! ```

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::hooks::Hooks;
use crate::result::RunResult;

/// Lifecycle logger.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl<T> Hooks<T> for LogWriter {
    fn on_begin(&self, _ctx: &CancellationToken, total: usize) {
        tracing::info!(total, "[begin]");
    }

    fn on_before(&self, _ctx: &CancellationToken, _item: &T, attempt: u32) {
        tracing::debug!(attempt, "[before]");
    }

    fn on_after(
        &self,
        _ctx: &CancellationToken,
        _item: &T,
        err: Option<&TaskError>,
        elapsed: Duration,
    ) {
        tracing::debug!(ok = err.is_none(), ?elapsed, "[after]");
    }

    fn on_error(&self, _ctx: &CancellationToken, _item: &T, err: &TaskError, attempt: u32) {
        tracing::warn!(attempt, label = err.as_label(), %err, "[error]");
    }

    fn on_end(&self, _ctx: &CancellationToken, r: &RunResult) {
        tracing::info!(
            total = r.total,
            success = r.success,
            failed = r.failed,
            cancelled = r.cancelled,
            retried = r.retried,
            aborted = r.aborted,
            elapsed = ?r.duration(),
            "[end]"
        );
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
