//! # Executor: one-shot bounded-concurrency run.
//!
//! [`Executor`] owns the resolved configuration and the per-run state. It runs
//! exactly once, over a batch ([`Executor::run`]) or a stream ([`Executor::run_stream`]).
//!
//! ## Architecture
//! ```text
//! run(ctx, items, handler)
//!   ├─► claim (one-shot CAS)
//!   ├─► run token = ctx.child_token()      (cancelled when run returns)
//!   ├─► hooks.begin(total)
//!   └─► join! {
//!         feeder ──► mpsc(2 × concurrency) ──► worker 1..N (JoinSet)
//!       }
//!   └─► state.fill(result) ──► hooks.end(result)
//! ```
//!
//! ## Rules
//! - A second call returns [`ExecutorError::AlreadyUsed`] without touching state.
//! - Handler failures never surface as `Err`; they are counted in [`RunResult`].
//! - Dropping the returned future aborts the workers (the `JoinSet` is dropped).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::feeder::{feed_batch, feed_stream};
use crate::core::worker::{Queue, Shared, Worker};
use crate::error::ExecutorError;
use crate::result::RunResult;
use crate::tasks::{HandlerRef, WorkItem};

/// Bounded-concurrency executor for items of type `T`.
///
/// Build one per run; see the [crate docs](crate) for a full example.
pub struct Executor<T> {
    shared: Arc<Shared<T>>,
    used: AtomicBool,
}

impl<T: Send + Sync + 'static> Executor<T> {
    /// Validates `cfg`, fills its defaults and creates an unused executor.
    ///
    /// # Errors
    /// [`ExecutorError::Config`] if the configuration is invalid.
    pub fn new(mut cfg: Config<T>) -> Result<Self, ExecutorError> {
        cfg.validate()?;
        cfg.set_defaults();

        Ok(Self {
            shared: Arc::new(Shared::from_config(cfg)),
            used: AtomicBool::new(false),
        })
    }

    /// Returns the executor name.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Runs `handler` over every item of `items`.
    ///
    /// Items get ids `0..items.len()` in order. An empty batch fires
    /// `on_begin` and returns immediately, without `on_end`.
    ///
    /// # Errors
    /// [`ExecutorError::AlreadyUsed`] if this executor already ran.
    pub async fn run(
        &self,
        ctx: &CancellationToken,
        items: Vec<T>,
        handler: HandlerRef<T>,
    ) -> Result<RunResult, ExecutorError> {
        self.claim()?;

        let mut result = RunResult::started(items.len());
        let token = ctx.child_token();
        let _guard = token.clone().drop_guard();

        self.shared.hooks.begin(&token, result.total);
        if items.is_empty() {
            result.ended_at = SystemTime::now();
            return Ok(result);
        }
        self.log_start(handler.name(), result.total);

        let (tx, rx) = mpsc::channel(self.shared.queue_capacity);
        let workers = self.spawn_workers(rx, &handler, &token);

        tokio::join!(feed_batch(tx, items, &token), join_workers(workers));
        Ok(self.finish(&token, result))
    }

    /// Runs `handler` over items pulled from `input` until it yields `None`
    /// or the run is cancelled.
    ///
    /// `on_begin` receives `0`; `total` in the result is the number of items
    /// pulled. `input` is left open and stays with the caller.
    ///
    /// # Errors
    /// [`ExecutorError::AlreadyUsed`] if this executor already ran.
    pub async fn run_stream(
        &self,
        ctx: &CancellationToken,
        input: &mut mpsc::Receiver<T>,
        handler: HandlerRef<T>,
    ) -> Result<RunResult, ExecutorError> {
        self.claim()?;

        let mut result = RunResult::started(0);
        let token = ctx.child_token();
        let _guard = token.clone().drop_guard();

        self.shared.hooks.begin(&token, 0);
        self.log_start(handler.name(), 0);

        let (tx, rx) = mpsc::channel(self.shared.queue_capacity);
        let workers = self.spawn_workers(rx, &handler, &token);

        let (pulled, ()) = tokio::join!(feed_stream(tx, input, &token), join_workers(workers));
        result.total = pulled;
        Ok(self.finish(&token, result))
    }

    /// Marks the executor as used; fails if it already was.
    fn claim(&self) -> Result<(), ExecutorError> {
        self.used
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| ExecutorError::AlreadyUsed)
    }

    fn spawn_workers(
        &self,
        rx: mpsc::Receiver<WorkItem<T>>,
        handler: &HandlerRef<T>,
        token: &CancellationToken,
    ) -> JoinSet<()> {
        let queue: Queue<T> = Arc::new(Mutex::new(rx));
        let mut set = JoinSet::new();

        for _ in 0..self.shared.concurrency {
            let worker = Worker {
                shared: Arc::clone(&self.shared),
                handler: Arc::clone(handler),
                token: token.clone(),
            };
            set.spawn(worker.run(Arc::clone(&queue)));
        }
        set
    }

    fn log_start(&self, handler: &str, total: usize) {
        tracing::debug!(
            executor = %self.shared.name,
            handler,
            total,
            concurrency = self.shared.concurrency,
            "run started"
        );
    }

    /// Assembles the final result and fires `on_end`.
    fn finish(&self, token: &CancellationToken, mut result: RunResult) -> RunResult {
        self.shared.state.fill(&mut result);
        result.ended_at = SystemTime::now();

        tracing::debug!(
            executor = %self.shared.name,
            total = result.total,
            success = result.success,
            failed = result.failed,
            cancelled = result.cancelled,
            retried = result.retried,
            aborted = result.aborted,
            elapsed = ?result.duration(),
            "run finished"
        );

        self.shared.hooks.end(token, &result);
        result
    }
}

/// Waits for every worker to exit.
async fn join_workers(mut set: JoinSet<()>) {
    while let Some(res) = set.join_next().await {
        if let Err(e) = res {
            tracing::warn!(error = %e, "worker exited abnormally");
        }
    }
}
