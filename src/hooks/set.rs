//! # Panic-isolated fan-out to hooks.
//!
//! [`HookSet`] calls every registered [`Hooks`] implementation in registration
//! order. Each call runs under `catch_unwind`:
//! - a panic is logged with the hook name and swallowed
//! - the remaining hooks still run
//! - the worker that triggered the call carries on
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave a hook's own state
//! inconsistent if it panics while holding a lock.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{TaskError, panic_message};
use crate::hooks::Hooks;
use crate::result::RunResult;

/// Ordered collection of hooks for one executor.
pub(crate) struct HookSet<T> {
    hooks: Vec<Arc<dyn Hooks<T>>>,
}

impl<T: 'static> HookSet<T> {
    pub fn new(hooks: Vec<Arc<dyn Hooks<T>>>) -> Self {
        Self { hooks }
    }

    pub fn begin(&self, ctx: &CancellationToken, total: usize) {
        self.each(|h| h.on_begin(ctx, total));
    }

    pub fn before(&self, ctx: &CancellationToken, item: &T, attempt: u32) {
        self.each(|h| h.on_before(ctx, item, attempt));
    }

    pub fn after(
        &self,
        ctx: &CancellationToken,
        item: &T,
        err: Option<&TaskError>,
        elapsed: Duration,
    ) {
        self.each(|h| h.on_after(ctx, item, err, elapsed));
    }

    pub fn error(&self, ctx: &CancellationToken, item: &T, err: &TaskError, attempt: u32) {
        self.each(|h| h.on_error(ctx, item, err, attempt));
    }

    pub fn end(&self, ctx: &CancellationToken, result: &RunResult) {
        self.each(|h| h.on_end(ctx, result));
    }

    fn each(&self, call: impl Fn(&dyn Hooks<T>)) {
        for hook in &self.hooks {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| call(hook.as_ref()))) {
                tracing::warn!(
                    hook = hook.name(),
                    info = %panic_message(&*payload),
                    "hook panicked"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting(AtomicUsize);

    impl Hooks<u32> for Counting {
        fn on_before(&self, _ctx: &CancellationToken, _item: &u32, _attempt: u32) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Exploding;

    impl Hooks<u32> for Exploding {
        fn on_before(&self, _ctx: &CancellationToken, _item: &u32, _attempt: u32) {
            panic!("hook exploded");
        }
    }

    #[test]
    fn test_panicking_hook_does_not_stop_others() {
        let counting = Arc::new(Counting::default());
        let set = HookSet::new(vec![
            Arc::new(Exploding) as Arc<dyn Hooks<u32>>,
            counting.clone(),
        ]);

        let ctx = CancellationToken::new();
        set.before(&ctx, &1, 0);
        set.before(&ctx, &2, 0);

        assert_eq!(counting.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_default_methods_are_noops() {
        struct Silent;
        impl Hooks<u32> for Silent {}

        let set = HookSet::new(vec![Arc::new(Silent) as Arc<dyn Hooks<u32>>]);
        let ctx = CancellationToken::new();
        set.begin(&ctx, 3);
        set.after(&ctx, &1, None, Duration::from_millis(1));
        set.error(&ctx, &1, &TaskError::Canceled, 0);
        set.end(&ctx, &RunResult::started(3));
    }
}
