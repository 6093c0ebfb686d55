//! # Strategies: how lifecycle calls reach a runtime.
//!
//! A [`Strategy`] sits between a [`Worker`](crate::Worker) (or an
//! [`Orchestrator`](crate::Orchestrator)) and the runtime it drives. Every
//! method has a pass-through default, so a strategy overrides only what it
//! changes.
//!
//! ```text
//! Worker::run() ──► Strategy::run(receptor) ──► receptor.run()
//!                      (retries, backoff, reclassification, ...)
//! ```
//!
//! Strategies are shared read-only by every worker of a pool.

use async_trait::async_trait;

use crate::error::{Error, aggregate};
use crate::policies::BackoffPolicy;
use crate::runtime::Runtime;

/// Mediates lifecycle operations applied to a [`Runtime`].
#[async_trait]
pub trait Strategy: Send + Sync + 'static {
    async fn init(&self, runtime: &dyn Runtime) -> Result<(), Error> {
        runtime.init().await
    }

    async fn run(&self, runtime: &dyn Runtime) -> Result<(), Error> {
        runtime.run().await
    }

    async fn stop(&self, runtime: &dyn Runtime) -> Result<(), Error> {
        runtime.stop().await
    }

    async fn handle_error(&self, runtime: &dyn Runtime, err: Error) -> Result<(), Error> {
        runtime.handle_error(err).await
    }
}

/// Pure pass-through strategy.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultStrategy;

impl Strategy for DefaultStrategy {}

/// Retries a failing `run` in place.
///
/// Up to `attempts` tries in total, sleeping `backoff.next(n)` after the
/// `n`-th failure. When every try fails the result is one `ErrorList` holding
/// each attempt's error, oldest first. `init`, `stop` and `handle_error` pass
/// through.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use slotvisor::{BackoffPolicy, RetryStrategy};
///
/// let retry = RetryStrategy::new(3, BackoffPolicy::constant(Duration::from_millis(50)));
/// assert_eq!(retry.attempts(), 3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RetryStrategy {
    attempts: u32,
    backoff: BackoffPolicy,
}

impl RetryStrategy {
    /// `attempts` is clamped to at least 1.
    pub fn new(attempts: u32, backoff: BackoffPolicy) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn backoff(&self) -> BackoffPolicy {
        self.backoff
    }
}

#[async_trait]
impl Strategy for RetryStrategy {
    async fn run(&self, runtime: &dyn Runtime) -> Result<(), Error> {
        let mut errors = Vec::new();
        for attempt in 0..self.attempts {
            match runtime.run().await {
                Ok(()) => return Ok(()),
                Err(e) => errors.push(e),
            }
            if attempt + 1 < self.attempts {
                tokio::time::sleep(self.backoff.next(attempt)).await;
            }
        }
        aggregate(
            format!(
                "{} {}: run failed after {} attempts",
                runtime.kind(),
                runtime.name(),
                self.attempts
            ),
            errors,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Fails its first `failures` runs.
    struct Flaky {
        failures: u32,
        runs: AtomicU32,
    }

    impl Flaky {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                runs: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Runtime for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn kind(&self) -> &str {
            "test"
        }

        async fn run(&self) -> Result<(), Error> {
            let n = self.runs.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(Error::run(format!("attempt {n}")))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn default_strategy_forwards() {
        let rt = Flaky::new(1);
        assert!(DefaultStrategy.run(&rt).await.is_err());
        assert!(DefaultStrategy.run(&rt).await.is_ok());

        let err = DefaultStrategy
            .handle_error(&rt, Error::run("boom"))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "boom");
    }

    #[tokio::test(start_paused = true)]
    async fn retry_recovers_before_exhausting_attempts() {
        let rt = Flaky::new(2);
        let retry = RetryStrategy::new(3, BackoffPolicy::constant(Duration::from_secs(1)));

        let started = tokio::time::Instant::now();
        retry.run(&rt).await.unwrap();

        assert_eq!(rt.runs.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_reports_every_attempt() {
        let rt = Flaky::new(u32::MAX);
        let retry = RetryStrategy::new(3, BackoffPolicy::constant(Duration::from_millis(10)));

        let err = retry.run(&rt).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ErrorList);
        let messages: Vec<&str> = err.sub_errors().iter().map(Error::message).collect();
        assert_eq!(messages, ["attempt 0", "attempt 1", "attempt 2"]);
    }

    #[test]
    fn retry_needs_at_least_one_attempt() {
        assert_eq!(RetryStrategy::new(0, BackoffPolicy::default()).attempts(), 1);
    }
}
