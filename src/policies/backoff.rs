//! # Backoff strategies for retried tasks.
//!
//! [`BackoffPolicy`] maps a retry attempt number to a delay. It is a pure
//! function: no state is carried between calls, so the delay for attempt `n`
//! is the same no matter how many other tasks are retrying.
//!
//! The attempt passed in is **1-based**: the first retry is attempt 1.
//!
//! | Variant         | Delay for attempt `n`                    |
//! |-----------------|------------------------------------------|
//! | `Constant(d)`   | `d`                                      |
//! | `Linear(b)`     | `b × n`                                  |
//! | `Exponential`   | `base × 2^(n-1)`, capped at `max`        |
//! | `Fibonacci`     | `base × fib(n)`, capped at `max`         |
//! | `Custom(f)`     | `f(n)`                                   |
//!
//! A `max` of zero disables the cap. Arithmetic saturates at [`Duration::MAX`]
//! instead of overflowing.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use batchvisor::BackoffPolicy;
//!
//! let backoff = BackoffPolicy::Exponential {
//!     base: Duration::from_millis(100),
//!     max: Duration::from_secs(1),
//! };
//!
//! assert_eq!(backoff.delay(1), Duration::from_millis(100));
//! assert_eq!(backoff.delay(4), Duration::from_millis(800));
//! // 1.6s is capped at max=1s
//! assert_eq!(backoff.delay(5), Duration::from_secs(1));
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Exponent cap; `2^61` still fits comfortably in the nanosecond arithmetic.
const MAX_EXPONENTIAL_ATTEMPT: u32 = 62;

/// Largest `n` for which `fib(n)` fits in a `u64`.
const MAX_FIBONACCI_ATTEMPT: u32 = 92;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Retry backoff strategy.
#[derive(Clone)]
pub enum BackoffPolicy {
    /// Same delay before every retry.
    Constant(Duration),
    /// Delay grows linearly: `base × attempt`.
    Linear(Duration),
    /// Delay doubles per attempt: `base × 2^(attempt-1)`, capped at `max` if non-zero.
    Exponential {
        /// Delay before the first retry.
        base: Duration,
        /// Upper bound (`Duration::ZERO` = uncapped).
        max: Duration,
    },
    /// Delay follows the Fibonacci sequence: `base × fib(attempt)`, capped at `max` if non-zero.
    Fibonacci {
        /// Unit delay multiplied by the Fibonacci number.
        base: Duration,
        /// Upper bound (`Duration::ZERO` = uncapped).
        max: Duration,
    },
    /// Caller-supplied mapping.
    Custom(Arc<dyn Fn(u32) -> Duration + Send + Sync>),
}

impl BackoffPolicy {
    /// Wraps a function as a [`BackoffPolicy::Custom`].
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        BackoffPolicy::Custom(Arc::new(f))
    }

    /// Returns the delay before retry number `attempt` (1-based).
    ///
    /// Attempt `0` means no retry has happened yet: exponential and
    /// fibonacci return [`Duration::ZERO`], linear returns zero by arithmetic.
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            BackoffPolicy::Constant(delay) => *delay,
            BackoffPolicy::Linear(base) => base.saturating_mul(attempt),
            BackoffPolicy::Exponential { base, max } => {
                if attempt == 0 {
                    return Duration::ZERO;
                }
                let exp = attempt.min(MAX_EXPONENTIAL_ATTEMPT) - 1;
                cap(scale(*base, 1u128 << exp), *max)
            }
            BackoffPolicy::Fibonacci { base, max } => {
                if attempt == 0 {
                    return Duration::ZERO;
                }
                let n = attempt.min(MAX_FIBONACCI_ATTEMPT);
                cap(scale(*base, u128::from(fibonacci(n))), *max)
            }
            BackoffPolicy::Custom(f) => f(attempt),
        }
    }
}

impl fmt::Debug for BackoffPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackoffPolicy::Constant(d) => f.debug_tuple("Constant").field(d).finish(),
            BackoffPolicy::Linear(d) => f.debug_tuple("Linear").field(d).finish(),
            BackoffPolicy::Exponential { base, max } => f
                .debug_struct("Exponential")
                .field("base", base)
                .field("max", max)
                .finish(),
            BackoffPolicy::Fibonacci { base, max } => f
                .debug_struct("Fibonacci")
                .field("base", base)
                .field("max", max)
                .finish(),
            BackoffPolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// `base × factor`, saturating at [`Duration::MAX`].
fn scale(base: Duration, factor: u128) -> Duration {
    match base.as_nanos().checked_mul(factor) {
        Some(nanos) => from_nanos_saturating(nanos),
        None => Duration::MAX,
    }
}

fn from_nanos_saturating(nanos: u128) -> Duration {
    let secs = nanos / NANOS_PER_SEC;
    match u64::try_from(secs) {
        Ok(secs) => Duration::new(secs, (nanos % NANOS_PER_SEC) as u32),
        Err(_) => Duration::MAX,
    }
}

fn cap(delay: Duration, max: Duration) -> Duration {
    if max > Duration::ZERO && delay > max {
        max
    } else {
        delay
    }
}

fn fibonacci(n: u32) -> u64 {
    if n <= 1 {
        return u64::from(n);
    }
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 2..=n {
        let next = a + b;
        a = b;
        b = next;
    }
    b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_constant_ignores_attempt() {
        let policy = BackoffPolicy::Constant(ms(250));
        for attempt in 0..10 {
            assert_eq!(policy.delay(attempt), ms(250), "attempt {attempt}");
        }
    }

    #[test]
    fn test_linear_growth() {
        let policy = BackoffPolicy::Linear(ms(100));
        assert_eq!(policy.delay(0), Duration::ZERO);
        assert_eq!(policy.delay(1), ms(100));
        assert_eq!(policy.delay(3), ms(300));
        assert_eq!(policy.delay(10), ms(1000));
    }

    #[test]
    fn test_exponential_growth_and_cap() {
        let policy = BackoffPolicy::Exponential {
            base: ms(100),
            max: Duration::from_secs(1),
        };
        assert_eq!(policy.delay(1), ms(100));
        assert_eq!(policy.delay(2), ms(200));
        assert_eq!(policy.delay(3), ms(400));
        assert_eq!(policy.delay(4), ms(800));
        assert_eq!(policy.delay(5), Duration::from_secs(1));
        assert_eq!(policy.delay(10), Duration::from_secs(1));
    }

    #[test]
    fn test_exponential_attempt_zero_is_zero() {
        let policy = BackoffPolicy::Exponential {
            base: ms(100),
            max: Duration::from_secs(1),
        };
        assert_eq!(policy.delay(0), Duration::ZERO);
    }

    #[test]
    fn test_exponential_one_second_base_one_minute_cap() {
        let policy = BackoffPolicy::Exponential {
            base: Duration::from_secs(1),
            max: Duration::from_secs(60),
        };
        assert_eq!(policy.delay(1), Duration::from_secs(1));
        assert_eq!(policy.delay(5), Duration::from_secs(16));
        assert_eq!(policy.delay(7), Duration::from_secs(60));
    }

    #[test]
    fn test_exponential_huge_attempt_clamps() {
        let capped = BackoffPolicy::Exponential {
            base: ms(100),
            max: Duration::from_secs(60),
        };
        assert_eq!(capped.delay(u32::MAX), Duration::from_secs(60));

        let uncapped = BackoffPolicy::Exponential {
            base: ms(1),
            max: Duration::ZERO,
        };
        // 1ms × 2^61 must not overflow
        assert_eq!(uncapped.delay(u32::MAX), uncapped.delay(MAX_EXPONENTIAL_ATTEMPT));
        assert!(uncapped.delay(u32::MAX) > Duration::from_secs(60 * 60 * 24 * 365));
    }

    #[test]
    fn test_exponential_saturates_on_huge_base() {
        let policy = BackoffPolicy::Exponential {
            base: Duration::MAX,
            max: Duration::ZERO,
        };
        assert_eq!(policy.delay(40), Duration::MAX);
    }

    #[test]
    fn test_fibonacci_sequence_and_cap() {
        let policy = BackoffPolicy::Fibonacci {
            base: ms(10),
            max: ms(100),
        };
        assert_eq!(policy.delay(0), Duration::ZERO);
        assert_eq!(policy.delay(1), ms(10));
        assert_eq!(policy.delay(2), ms(10));
        assert_eq!(policy.delay(3), ms(20));
        assert_eq!(policy.delay(4), ms(30));
        assert_eq!(policy.delay(5), ms(50));
        assert_eq!(policy.delay(6), ms(80));
        assert_eq!(policy.delay(7), ms(100));
        assert_eq!(policy.delay(u32::MAX), ms(100));
    }

    #[test]
    fn test_fibonacci_clamp_fits_u64() {
        assert_eq!(fibonacci(92), 7_540_113_804_746_346_429);
        let policy = BackoffPolicy::Fibonacci {
            base: Duration::from_nanos(1),
            max: Duration::ZERO,
        };
        assert_eq!(policy.delay(500), Duration::from_nanos(7_540_113_804_746_346_429));
    }

    #[test]
    fn test_custom() {
        let policy = BackoffPolicy::custom(|attempt| ms(u64::from(attempt) * 7));
        assert_eq!(policy.delay(3), ms(21));
        assert_eq!(format!("{policy:?}"), "Custom(..)");
    }
}
