//! # Lifecycle hooks.
//!
//! Hooks observe a run without influencing it. The executor calls them inline,
//! on the worker that processes the item, through a panic-isolated `HookSet`.
//!
//! ## Architecture
//! ```text
//! Executor ──► HookSet ──► catch_unwind ──► hook1.on_*()
//!                     │                 └──► panic → tracing::warn!, keep going
//!                     ├──► hook2.on_*()
//!                     └──► hookN.on_*()
//! ```
//!
//! ## Built-in hooks
//! - `LogWriter` (feature `logging`): logs every call through `tracing`.

mod hook;
#[cfg(feature = "logging")]
mod log;
mod set;

pub use hook::Hooks;
#[cfg(feature = "logging")]
pub use log::LogWriter;
pub(crate) use set::HookSet;
