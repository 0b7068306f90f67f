//! # Example: batch
//!
//! Runs a batch of simulated uploads through an [`Executor`] with the built-in
//! [`LogWriter`] hook attached, so every lifecycle call shows up in the log.
//!
//! Some uploads fail, one panics. The panic is contained with
//! [`PanicAsContinue`], failures are grouped by message.
//!
//! ## Flow
//! ```text
//! Executor::run(items)
//!   ├─► [begin] total=24
//!   ├─► worker × 4:
//!   │     ├─► [before] attempt=0
//!   │     ├─► upload()  → Ok / Err("quota exceeded") / panic
//!   │     ├─► [after]
//!   │     └─► [error] (failures only)
//!   └─► [end] success=… failed=…
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example batch --features logging
//! ```

use std::time::Duration;

use batchvisor::{Config, Executor, HandlerFn, LogWriter, PanicAsContinue, TaskError};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Install a tracing subscriber (RUST_LOG controls verbosity)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // 2. Configure the executor
    let cfg = Config::<u32>::new(4)
        .with_name("uploader")
        .with_timeout(Duration::from_secs(1))
        .with_panic_policy(PanicAsContinue)
        .with_error_aggregation(true)
        .with_hooks(LogWriter::new());
    let exec = Executor::new(cfg)?;

    // 3. Define the handler
    let upload = HandlerFn::arc("upload", |ctx: CancellationToken, id: u32| async move {
        if ctx.is_cancelled() {
            return Err(TaskError::Canceled);
        }
        tokio::time::sleep(Duration::from_millis(20 + u64::from(id % 5) * 10)).await;
        match id {
            13 => panic!("corrupt file #{id}"),
            id if id % 6 == 0 => Err(TaskError::fail("quota exceeded")),
            _ => Ok(()),
        }
    });

    // 4. Run and print the summary
    let res = exec
        .run(&CancellationToken::new(), (1..=24).collect(), upload)
        .await?;

    println!(
        "[main] total={} success={} failed={} ({:.1}% ok) in {:?}",
        res.total,
        res.success,
        res.failed,
        res.success_rate(),
        res.duration()
    );
    for (msg, count) in &res.error_count {
        println!("[main] {count:>3} × {msg}");
    }
    Ok(())
}
