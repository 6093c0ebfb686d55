//! Concurrency-safe containers.
//!
//! Four coarse-grained containers, each guarded by a single exclusive
//! [`parking_lot::Mutex`] held for the full duration of every operation:
//! - [`SafeMap`] key → value map;
//! - [`SafeSet`] key-existence set with atomic test-and-set;
//! - [`SafeArray`] index-addressable resizable array;
//! - [`SafeQueue`] bounded FIFO queue.
//!
//! ## Rules
//! - No method observes a partially-applied write from another call.
//! - Out-of-range access returns `None`/`false`, it never panics.
//! - Locks are never held across an `.await` point.
//!
//! Contention is bounded by the number of worker slots, not by request volume,
//! so one lock per container is enough. Sharding or reader/writer separation
//! would reduce contention under heavier access.

mod array;
mod map;
mod queue;
mod set;

pub use array::SafeArray;
pub use map::SafeMap;
pub use queue::SafeQueue;
pub use set::SafeSet;
