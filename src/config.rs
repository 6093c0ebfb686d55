//! # Global runtime configuration.
//!
//! [`Config`] centralizes settings for an orchestrator and the pools it builds.
//!
//! Config is used in three ways:
//! 1. **Orchestrator creation**: `Orchestrator::builder(name, config)`
//! 2. **Pool defaults**: `PoolSpec::with_defaults(name, factory, &config)`
//! 3. **Leaser defaults**: `LeaserBuilder::from_config(&config)`
//!
//! ## Sentinel values
//! - `grace = 0s` → do not wait for run-loops after cancellation
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::policies::{BackoffPolicy, JitterPolicy};

/// Global configuration for the supervision runtime.
///
/// ## Field semantics
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `replicas`: default worker slots per pool
/// - `respawn_backoff`: delay between consecutive failed run-loop iterations of one slot
/// - `grace`: maximum wait for the run fan-out to join after cancellation
/// - `lease_duration`: default lease length for [`LeaserBuilder`](crate::LeaserBuilder)
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel.
    ///
    /// Receivers lagging more than `bus_capacity` events skip the oldest ones.
    pub bus_capacity: usize,

    /// Default number of worker slots per pool.
    ///
    /// Used by `PoolSpec::with_defaults()`. Can be overridden per pool.
    pub replicas: usize,

    /// Backoff between failed iterations of a run-loop slot.
    ///
    /// The attempt counter resets after a successful iteration.
    pub respawn_backoff: BackoffPolicy,

    /// Maximum time `Orchestrator::serve` waits for run-loops to exit once
    /// shutdown was requested. Exceeding it yields an `ErrorKind::Shutdown` error.
    pub grace: Duration,

    /// Default lease duration.
    pub lease_duration: Duration,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the grace period as an `Option` (`None` = do not wait).
    #[inline]
    pub fn grace_period(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `replicas = 1`
    /// - `respawn_backoff = 100ms × 2^n, capped at 30s, no jitter`
    /// - `grace = 30s`
    /// - `lease_duration = 10s`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            replicas: 1,
            respawn_backoff: BackoffPolicy {
                first: Duration::from_millis(100),
                max: Duration::from_secs(30),
                factor: 2.0,
                jitter: JitterPolicy::None,
            },
            grace: Duration::from_secs(30),
            lease_duration: Duration::from_secs(10),
        }
    }
}
