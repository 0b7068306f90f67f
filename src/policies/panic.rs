//! # Panic policies.
//!
//! A [`PanicPolicy`] decides what a caught handler panic means for the run.
//! There is deliberately no retry action: a panic is either contained to the
//! item ([`PanicAction::Continue`]) or stops everything ([`PanicAction::Abort`]).
//!
//! In both cases the panic is converted into [`TaskError::Panic`](crate::TaskError::Panic)
//! and then handled like any other failed attempt.

use std::any::Any;

/// Action to take after a handler panic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PanicAction {
    /// Treat the panic as an ordinary failure of this item.
    Continue,
    /// Cancel the whole run (default).
    #[default]
    Abort,
}

/// Decides how to react to a handler panic.
///
/// `panic` is the raw payload; `attempt` is zero-based. A policy that panics
/// itself ends the item as failed.
pub trait PanicPolicy<T>: Send + Sync + 'static {
    /// Returns the action for this panic.
    fn decide(&self, panic: &(dyn Any + Send), item: &T, attempt: u32) -> PanicAction;
}

impl<T, F> PanicPolicy<T> for F
where
    F: Fn(&(dyn Any + Send), &T, u32) -> PanicAction + Send + Sync + 'static,
{
    fn decide(&self, panic: &(dyn Any + Send), item: &T, attempt: u32) -> PanicAction {
        self(panic, item, attempt)
    }
}

/// Aborts the run on any panic (default).
#[derive(Clone, Copy, Debug, Default)]
pub struct PanicAsAbort;

impl<T> PanicPolicy<T> for PanicAsAbort {
    fn decide(&self, _panic: &(dyn Any + Send), _item: &T, _attempt: u32) -> PanicAction {
        PanicAction::Abort
    }
}

/// Contains the panic to its item; other workers keep going.
#[derive(Clone, Copy, Debug, Default)]
pub struct PanicAsContinue;

impl<T> PanicPolicy<T> for PanicAsContinue {
    fn decide(&self, _panic: &(dyn Any + Send), _item: &T, _attempt: u32) -> PanicAction {
        PanicAction::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_policies() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(PanicAsAbort.decide(&*payload, &1u8, 0), PanicAction::Abort);
        assert_eq!(PanicAsContinue.decide(&*payload, &1u8, 0), PanicAction::Continue);
        assert_eq!(PanicAction::default(), PanicAction::Abort);
    }

    #[test]
    fn test_closure_inspects_payload() {
        let policy = |panic: &(dyn Any + Send), _item: &u8, _attempt: u32| {
            match panic.downcast_ref::<&'static str>() {
                Some(msg) if msg.starts_with("recoverable") => PanicAction::Continue,
                _ => PanicAction::Abort,
            }
        };
        let soft: Box<dyn Any + Send> = Box::new("recoverable: bad row");
        let hard: Box<dyn Any + Send> = Box::new(7i32);
        assert_eq!(policy.decide(&*soft, &0, 0), PanicAction::Continue);
        assert_eq!(policy.decide(&*hard, &0, 0), PanicAction::Abort);
    }
}
