//! # Example: stream_with_retry
//!
//! Feeds an [`Executor`] from a channel while a producer is still generating
//! work. Flaky items are retried with exponential backoff plus jitter; a
//! custom [`Hooks`] implementation prints every retry.
//!
//! ## Flow
//! ```text
//! producer ──► mpsc::Receiver<Job> ──► Executor::run_stream()
//!                                        ├─► attempt 0 → Err(Deadline)
//!                                        ├─► RetryOnTimeout → Retry
//!                                        ├─► sleep(jitter(backoff(1)))
//!                                        └─► attempt 1 → Ok
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example stream_with_retry
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use batchvisor::{
    BackoffPolicy, Config, Executor, Handler, Hooks, JitterPolicy, RetryOnTimeout, RunResult,
    TaskError,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A unit of work produced upstream.
struct Job {
    id: u32,
    /// How many attempts time out before the job goes through.
    flaky_for: u32,
    tries: AtomicU32,
}

/// Calls a fake remote service.
struct RemoteCall;

#[async_trait]
impl Handler<Job> for RemoteCall {
    fn name(&self) -> &str {
        "remote-call"
    }

    async fn handle(&self, ctx: CancellationToken, job: &Job) -> Result<(), TaskError> {
        let attempt = job.tries.fetch_add(1, Ordering::Relaxed);
        tokio::select! {
            _ = ctx.cancelled() => return Err(TaskError::Canceled),
            _ = tokio::time::sleep(Duration::from_millis(15)) => {}
        }
        if attempt < job.flaky_for {
            return Err(TaskError::deadline(format!("job {} upstream slow", job.id)));
        }
        Ok(())
    }
}

/// Prints retries and the final summary.
struct Progress;

impl Hooks<Job> for Progress {
    fn on_error(&self, _ctx: &CancellationToken, job: &Job, err: &TaskError, attempt: u32) {
        println!("[progress] job {} attempt {attempt} failed: {err}", job.id);
    }

    fn on_end(&self, _ctx: &CancellationToken, r: &RunResult) {
        println!(
            "[progress] done: total={} success={} failed={} retried={}",
            r.total, r.success, r.failed, r.retried
        );
    }

    fn name(&self) -> &'static str {
        "progress"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Configure: retry deadlines up to 3 times with backoff + jitter
    let cfg = Config::<Job>::new(3)
        .with_name("remote")
        .with_max_retry(3)
        .with_error_policy(RetryOnTimeout)
        .with_backoff(BackoffPolicy::Exponential {
            base: Duration::from_millis(50),
            max: Duration::from_millis(400),
        })
        .with_jitter(JitterPolicy::Equal)
        .with_hooks(Progress);
    let exec = Executor::new(cfg)?;

    // 2. Start a producer that trickles jobs into the channel
    let (tx, mut rx) = mpsc::channel::<Job>(8);
    let producer = tokio::spawn(async move {
        for id in 0..12 {
            let job = Job {
                id,
                flaky_for: if id % 4 == 0 { 2 } else { 0 },
                tries: AtomicU32::new(0),
            };
            if tx.send(job).await.is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    });

    // 3. Stop everything after 10s, whatever happens
    let ctx = CancellationToken::new();
    let deadline = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        deadline.cancel();
    });

    // 4. Drain the stream
    let res = exec.run_stream(&ctx, &mut rx, Arc::new(RemoteCall)).await?;
    producer.await?;

    println!("[main] finished in {:?}, aborted={}", res.duration(), res.aborted);
    Ok(())
}
