//! Delay policies.
//!
//! ## Contents
//! - [`BackoffPolicy`] how delays between failed attempts grow (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization applied on top of the computed delay
//!
//! ## Wiring
//! ```text
//! Config::respawn_backoff ─► RunLoop: sleep(backoff.next(failures)) between failed iterations
//! RetryStrategy::backoff  ─► sleep(backoff.next(attempt)) between retries of Runtime::run
//! ```

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
