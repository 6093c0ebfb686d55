//! # Backoff policy between failed attempts.
//!
//! The delay for attempt `n` (0-based) is `first × factor^n`, clamped to `max`,
//! then jittered. The base is derived from `n` alone, so jitter never feeds back
//! into later delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use slotvisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(1),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(100));
//! assert_eq!(backoff.next(3), Duration::from_millis(800));
//! assert_eq!(backoff.next(4), Duration::from_secs(1)); // capped
//! ```

use std::time::Duration;

use super::jitter::JitterPolicy;

/// Exponential backoff parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub first: Duration,
    /// Upper bound for any delay.
    pub max: Duration,
    /// Multiplicative growth per attempt (`1.0` = constant).
    pub factor: f64,
    /// Randomization applied to the clamped delay.
    pub jitter: JitterPolicy,
}

impl BackoffPolicy {
    /// Constant delay, no growth, no jitter.
    pub fn constant(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Computes the delay before attempt `attempt + 1`.
    pub fn next(&self, attempt: u32) -> Duration {
        let exp = attempt.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if secs.is_finite() && secs >= 0.0 && secs <= self.max.as_secs_f64() {
            Duration::from_secs_f64(secs)
        } else {
            self.max
        };
        self.jitter.apply(base)
    }
}

impl Default for BackoffPolicy {
    /// `first = 100ms`, `factor = 1.0`, `max = 30s`, no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }
}
