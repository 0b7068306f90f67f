//! Executor core: feeding, workers and result assembly.
//!
//! The only public API from this module is [`Executor`].
//!
//! Internal modules:
//! - [`executor`]: one-shot run orchestration, batch and stream entry points;
//! - [`feeder`]: pushes items with sequential ids into the bounded work channel;
//! - [`worker`]: per-item retry loop, policy decisions and abort;
//! - [`runner`]: executes one attempt with timeout and panic capture;
//! - [`state`]: atomic counters, abort latch, error samples and counts.

mod executor;
mod feeder;
mod runner;
mod state;
mod worker;


pub use executor::Executor;
