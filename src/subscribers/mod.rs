//! # Event subscribers.
//!
//! [`Subscribe`] is the extension point for observing lifecycle events published
//! on the [`Bus`](crate::Bus). A [`SubscriberSet`] gives each subscriber its own
//! bounded queue and worker task, and one listener task forwards the bus into it.
//! Closing the [`Listener`] flushes both before returning.
//!
//! ```text
//! Bus ──► SubscriberSet::listen ──► emit(&Event)
//!                                    ├──► [queue S1] ─► worker ─► LogWriter::on_event
//!                                    ├──► [queue S2] ─► worker ─► EventLog::on_event
//!                                    └──► [queue SN] ─► worker ─► custom
//! ```
//!
//! ## Built-in subscribers
//! - [`LogWriter`] (feature `logging`): forwards events to `tracing`.
//! - [`EventLog`]: keeps the most recent events in memory.

#[cfg(feature = "logging")]
mod log;
mod recorder;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use recorder::EventLog;
pub use set::{Listener, SubscriberSet};
pub use subscriber::Subscribe;
