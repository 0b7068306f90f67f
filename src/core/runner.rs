//! # Run a single attempt of a handler.
//!
//! Executes one attempt with an optional timeout, catching panics at the
//! invocation site so they never unwind into the worker.
//!
//! ```text
//! Success/failure:
//!   handler.handle() → Ok/Err        → Attempt::Completed(res)
//!
//! Timeout:
//!   timeout exceeded → cancel child  → Attempt::Completed(Err(Timeout))
//!
//! Panic:
//!   handler panics   → catch_unwind  → Attempt::Panicked { payload, error: Panic }
//! ```
//!
//! ## Rules
//! - Derives a **child token** per attempt; cancelling it never affects the run.
//! - The backtrace is taken at the panic site by a process-wide panic hook,
//!   installed once and chained to the previous hook. It only records panics
//!   raised while a handler is being polled. If another hook replaces it later,
//!   the backtrace falls back to the catch site.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::future::{self, Future};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;
use std::time::Duration;

use futures::FutureExt;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::{TaskError, panic_message};
use crate::tasks::Handler;

/// What came out of one attempt.
pub(crate) enum Attempt {
    /// The handler returned (or the attempt timed out).
    Completed(Result<(), TaskError>),
    /// The handler panicked. `payload` is kept for the panic policy.
    Panicked {
        payload: Box<dyn Any + Send>,
        error: TaskError,
    },
}

thread_local! {
    /// Set while a handler future is being polled on this thread.
    static ARMED: Cell<bool> = const { Cell::new(false) };
    /// Backtrace of the last panic raised while armed.
    static PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

fn install_panic_hook() {
    INSTALL_HOOK.call_once(|| {
        let prev = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if ARMED.with(Cell::get) {
                let trace = Backtrace::force_capture().to_string();
                PANIC_TRACE.with(|t| *t.borrow_mut() = Some(trace));
            }
            prev(info);
        }));
    });
}

/// Resets `ARMED` on drop, including while unwinding.
struct Armed;

impl Armed {
    fn set() -> Self {
        ARMED.with(|a| a.set(true));
        Armed
    }
}

impl Drop for Armed {
    fn drop(&mut self) {
        ARMED.with(|a| a.set(false));
    }
}

fn take_panic_trace() -> String {
    PANIC_TRACE
        .with(|t| t.borrow_mut().take())
        .unwrap_or_else(|| Backtrace::force_capture().to_string())
}

/// Executes one attempt of `handler` on `item`.
pub(crate) async fn run_once<T: Sync + 'static>(
    handler: &dyn Handler<T>,
    item: &T,
    parent: &CancellationToken,
    timeout: Option<Duration>,
) -> Attempt {
    install_panic_hook();
    PANIC_TRACE.with(|t| t.borrow_mut().take());

    let child = parent.child_token();
    let mut fut = handler.handle(child.clone(), item);
    let traced = future::poll_fn(move |cx| {
        let _armed = Armed::set();
        fut.as_mut().poll(cx)
    });
    let call = AssertUnwindSafe(traced).catch_unwind();

    let caught = match timeout {
        Some(dur) => match time::timeout(dur, call).await {
            Ok(caught) => caught,
            Err(_elapsed) => {
                child.cancel();
                return Attempt::Completed(Err(TaskError::Timeout { timeout: dur }));
            }
        },
        None => call.await,
    };

    match caught {
        Ok(res) => Attempt::Completed(res),
        Err(payload) => {
            let error = TaskError::Panic {
                message: panic_message(&*payload),
                backtrace: take_panic_trace(),
            };
            Attempt::Panicked { payload, error }
        }
    }
}
