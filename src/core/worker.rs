//! # Worker: per-item retry loop.
//!
//! A worker pulls [`WorkItem`]s from the shared queue until it is closed and
//! drained, driving each item to exactly one terminal outcome.
//!
//! ## Per-item flow
//! ```text
//! loop {
//!   ├─► run cancelled?            → Cancelled (handler not invoked)
//!   ├─► hooks.before()
//!   ├─► run_once() ─────► handler.handle()   (timeout + catch_unwind)
//!   │     └─► panicked? → panic_policy: Abort → abort run
//!   ├─► hooks.after()
//!   ├─► Ok                        → Success
//!   └─► Err → hooks.error()
//!         ├─► cancellation/timeout → Cancelled
//!         └─► record error, error_policy:
//!               ├─► Continue       → Failed
//!               ├─► Abort          → Failed + abort run
//!               └─► Retry
//!                     ├─► attempt >= max_retry → Failed
//!                     └─► retried++, attempt++, sleep(backoff) → loop
//!                           (cancelled sleep → Cancelled)
//! }
//! ```
//!
//! ## Rules
//! - Retries of one item run **sequentially** on the same worker.
//! - After cancellation, queued items are still dequeued and counted as cancelled.
//! - Handler panics are caught per attempt. A panic anywhere else in the loop
//!   (a user policy or custom backoff) is caught per item: the item counts as
//!   failed and the worker keeps consuming.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use futures::FutureExt;
use tokio::sync::{Mutex, mpsc};
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::runner::{Attempt, run_once};
use crate::core::state::{Outcome, RunState};
use crate::error::{TaskError, panic_message};
use crate::hooks::HookSet;
use crate::policies::{
    AlwaysContinue, BackoffPolicy, ErrorAction, ErrorPolicy, JitterPolicy, PanicAction,
    PanicAsAbort, PanicPolicy,
};
use crate::result::AbortReason;
use crate::tasks::{HandlerRef, WorkItem};

/// Receiving half of the work channel, shared by all workers.
pub(crate) type Queue<T> = Arc<Mutex<mpsc::Receiver<WorkItem<T>>>>;

/// Resolved settings and state shared by the executor and its workers.
pub(crate) struct Shared<T> {
    pub name: String,
    pub concurrency: usize,
    pub queue_capacity: usize,
    pub timeout: Option<Duration>,
    pub max_retry: u32,
    pub backoff: Option<BackoffPolicy>,
    pub jitter: JitterPolicy,
    pub error_policy: Arc<dyn ErrorPolicy<T>>,
    pub panic_policy: Arc<dyn PanicPolicy<T>>,
    pub hooks: HookSet<T>,
    pub state: RunState,
}

impl<T: 'static> Shared<T> {
    /// Builds the shared block from a validated config with defaults applied.
    pub fn from_config(cfg: Config<T>) -> Self {
        let timeout = cfg.attempt_timeout();
        let queue_capacity = cfg.queue_capacity();
        Self {
            name: cfg.name,
            concurrency: cfg.concurrency,
            queue_capacity,
            timeout,
            max_retry: cfg.max_retry,
            backoff: cfg.backoff,
            jitter: cfg.jitter,
            error_policy: cfg.error_policy.unwrap_or_else(|| Arc::new(AlwaysContinue)),
            panic_policy: cfg.panic_policy.unwrap_or_else(|| Arc::new(PanicAsAbort)),
            hooks: HookSet::new(cfg.hooks),
            state: RunState::new(cfg.max_error_samples, cfg.error_aggregation),
        }
    }

    /// Returns the delay before retry number `attempt`.
    fn retry_delay(&self, attempt: u32) -> Duration {
        match &self.backoff {
            Some(backoff) => self.jitter.apply(backoff.delay(attempt)),
            None => Duration::ZERO,
        }
    }
}

/// One queue consumer.
pub(crate) struct Worker<T> {
    pub shared: Arc<Shared<T>>,
    pub handler: HandlerRef<T>,
    /// The run token.
    pub token: CancellationToken,
}

impl<T: Send + Sync + 'static> Worker<T> {
    /// Consumes the queue until it is closed and empty.
    pub async fn run(self, queue: Queue<T>) {
        loop {
            let next = queue.lock().await.recv().await;
            let Some(work) = next else { break };
            let id = work.id;
            let outcome = match AssertUnwindSafe(self.process(work)).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(payload) => {
                    tracing::warn!(
                        executor = %self.shared.name,
                        task_id = id,
                        info = %panic_message(&*payload),
                        "policy panicked, item counted as failed"
                    );
                    Outcome::Failed
                }
            };
            self.shared.state.record(outcome);
        }
    }

    /// Drives one item to its terminal outcome.
    async fn process(&self, mut work: WorkItem<T>) -> Outcome {
        let s = &*self.shared;

        loop {
            if self.token.is_cancelled() {
                return Outcome::Cancelled;
            }

            s.hooks.before(&self.token, &work.payload, work.attempt);
            let started = Instant::now();

            let attempt =
                run_once(self.handler.as_ref(), &work.payload, &self.token, s.timeout).await;
            let res = match attempt {
                Attempt::Completed(res) => res,
                Attempt::Panicked { payload, error } => {
                    let action = s.panic_policy.decide(&*payload, &work.payload, work.attempt);
                    if action == PanicAction::Abort {
                        self.abort(&work, &error);
                    }
                    Err(error)
                }
            };

            s.hooks
                .after(&self.token, &work.payload, res.as_ref().err(), started.elapsed());

            let err = match res {
                Ok(()) => return Outcome::Success,
                Err(err) => err,
            };

            s.hooks.error(&self.token, &work.payload, &err, work.attempt);
            if err.is_cancellation() {
                return Outcome::Cancelled;
            }
            s.state.record_error(work.id, work.attempt, &err);

            match s.error_policy.decide(&err, &work.payload, work.attempt) {
                ErrorAction::Continue => return Outcome::Failed,
                ErrorAction::Abort => {
                    self.abort(&work, &err);
                    return Outcome::Failed;
                }
                ErrorAction::Retry => {
                    if work.attempt >= s.max_retry {
                        return Outcome::Failed;
                    }
                    s.state.retry();
                    work.attempt += 1;
                    if !self.backoff(work.attempt).await {
                        return Outcome::Cancelled;
                    }
                }
            }
        }
    }

    /// Sleeps before the next attempt; returns `false` if the run was cancelled meanwhile.
    async fn backoff(&self, attempt: u32) -> bool {
        let delay = self.shared.retry_delay(attempt);
        if delay.is_zero() {
            return true;
        }

        select! {
            _ = time::sleep(delay) => true,
            _ = self.token.cancelled() => false,
        }
    }

    /// Latches the abort reason (first writer wins) and cancels the run.
    fn abort(&self, work: &WorkItem<T>, err: &TaskError) {
        let reason = AbortReason {
            task_id: work.id,
            attempt: work.attempt,
            error: err.clone(),
            at: SystemTime::now(),
        };
        if self.shared.state.abort(reason) {
            tracing::warn!(
                executor = %self.shared.name,
                handler = self.handler.name(),
                task_id = work.id,
                attempt = work.attempt,
                error = %err,
                "run aborted"
            );
        }
        self.token.cancel();
    }
}
