//! # Unit of work passed from the feeder to the workers.

/// One item in flight, with its identity and retry counter.
///
/// Owned by exactly one worker from dequeue to terminal state, including all
/// of its retries.
#[derive(Debug)]
pub(crate) struct WorkItem<T> {
    /// Sequential id assigned at enqueue time (batch) or consumption time (stream).
    pub id: usize,
    /// The caller's item.
    pub payload: T,
    /// Zero-based attempt counter, incremented before each retry.
    pub attempt: u32,
}

impl<T> WorkItem<T> {
    /// Wraps a freshly enqueued item (attempt 0).
    pub fn new(id: usize, payload: T) -> Self {
        Self {
            id,
            payload,
            attempt: 0,
        }
    }
}
