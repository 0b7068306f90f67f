//! # Handler abstraction.
//!
//! A [`Handler`] processes one item per call. The executor invokes it once per
//! attempt, possibly from many workers at the same time, so implementations
//! must be safe for concurrent use.
//!
//! Each call receives a [`CancellationToken`] scoped to the attempt. It is
//! cancelled when the run is aborted or cancelled, and when the per-attempt
//! timeout expires. Long-running handlers should watch it and return
//! [`TaskError::Canceled`] promptly.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Shared handle to a handler, as accepted by the executor.
pub type HandlerRef<T> = Arc<dyn Handler<T>>;

/// # Asynchronous, cancelable item processor.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use batchvisor::{Handler, TaskError};
///
/// struct Upload;
///
/// #[async_trait]
/// impl Handler<String> for Upload {
///     fn name(&self) -> &str { "upload" }
///
///     async fn handle(&self, ctx: CancellationToken, path: &String) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         if path.is_empty() {
///             return Err(TaskError::fail("empty path"));
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler<T>: Send + Sync + 'static {
    /// Returns a human-readable handler name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Processes one item.
    async fn handle(&self, ctx: CancellationToken, item: &T) -> Result<(), TaskError>;
}
