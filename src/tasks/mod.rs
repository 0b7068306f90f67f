//! # Handler abstractions and work items.
//!
//! This module provides the item-processing types:
//! - [`Handler`] - trait for implementing async cancelable item processors
//! - [`HandlerFn`] - closure-based handler implementation
//! - [`HandlerRef`] - shared reference to a handler (`Arc<dyn Handler<T>>`)
//! - `WorkItem` - an item in flight with its id and attempt counter (internal)

mod handler;
mod handler_fn;
mod work;

pub use handler::{Handler, HandlerRef};
pub use handler_fn::HandlerFn;
pub(crate) use work::WorkItem;
