//! # Jitter applied to backoff delays.
//!
//! Many slots failing at the same moment (a shared dependency going down) would
//! otherwise respawn in lockstep.
//!
//! - [`JitterPolicy::None`] exact delay
//! - [`JitterPolicy::Full`] random in `[0, delay]`
//! - [`JitterPolicy::Equal`] `delay/2 + random[0, delay/2]`

use std::time::Duration;

use rand::Rng;

/// Randomization strategy for delays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// Use the computed delay as-is.
    #[default]
    None,
    /// Uniform in `[0, delay]`.
    Full,
    /// Half fixed, half uniform: `[delay/2, delay]`.
    Equal,
}

impl JitterPolicy {
    /// Applies this jitter to `delay`.
    pub fn apply(&self, delay: Duration) -> Duration {
        let ms = delay.as_millis().min(u128::from(u64::MAX)) as u64;
        if ms == 0 {
            return delay;
        }
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => Duration::from_millis(rand::rng().random_range(0..=ms)),
            JitterPolicy::Equal => {
                let half = ms / 2;
                Duration::from_millis(half + rand::rng().random_range(0..=ms - half))
            }
        }
    }
}
