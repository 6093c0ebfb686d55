//! # Event subscriber trait.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently of publishers)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (a panicking `on_event` is logged; the worker keeps going)
//!
//! ## Overflow behavior
//! A full queue drops the new event **for this subscriber only**; other
//! subscribers and publishers are unaffected.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use slotvisor::{Event, Status, Subscribe};
//!
//! struct FailureCounter(std::sync::atomic::AtomicUsize);
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.status == Status::Failed {
//!             self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Observer of lifecycle events.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally.
/// - Slow processing only fills this subscriber's own queue.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event. Events arrive in FIFO order per subscriber.
    async fn on_event(&self, event: &Event);

    /// Name used in diagnostics about this subscriber (overflow, panic).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred queue capacity (clamped to at least 1). Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
