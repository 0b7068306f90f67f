//! # Function-backed handler (`HandlerFn`)
//!
//! [`HandlerFn`] wraps a closure `F: Fn(CancellationToken, T) -> Fut`, producing a
//! fresh future per attempt. The item is cloned for every attempt, so the
//! closure owns its input and the worker keeps its own copy for retries.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use batchvisor::{Handler, HandlerFn, HandlerRef, TaskError};
//!
//! let h: HandlerRef<u32> = HandlerFn::arc("double", |_ctx: CancellationToken, n: u32| async move {
//!     n.checked_mul(2).map(|_| ()).ok_or_else(|| TaskError::fail("overflow"))
//! });
//!
//! assert_eq!(h.name(), "double");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::handler::Handler;

/// Function-backed handler implementation.
#[derive(Debug)]
pub struct HandlerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a [`HandlerRef`](crate::HandlerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<T, F, Fut> Handler<T> for HandlerFn<F>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(CancellationToken, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, ctx: CancellationToken, item: &T) -> Result<(), TaskError> {
        (self.f)(ctx, item.clone()).await
    }
}
