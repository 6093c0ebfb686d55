//! Time-bounded exclusive leases on string identifiers.
//!
//! A [`Leaser`] grants a lease for `id` only when no unexpired lease exists, and
//! renews it only for the holder that presents the exact expiry it was given
//! (compare-and-swap on the timestamp). This is a single-process, in-memory
//! time lock, not a distributed lock service.
//!
//! ```text
//! get_lease(id)                      reset_lease(id, alleged)
//!   lock ─► stored = map.get(id)       lock ─► stored = map.get(id)
//!        ├─ stored > now → Held              ├─ missing          → Unknown
//!        └─ else map.set(now + d)            ├─ stored ≠ alleged → Mismatch
//!                                            └─ map.set(now + d)
//! ```
//!
//! Expiries are [`tokio::time::Instant`]s, so a paused test clock drives them.

mod error;
mod leaser;

pub use error::LeaseError;
pub use leaser::{InMemoryLeaser, Leaser, LeaserBuilder};
