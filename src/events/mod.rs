//! Lifecycle events: types and broadcast bus.
//!
//! Every lifecycle transition at every layer (worker, worker pool, orchestrator)
//! is published as one [`Event`] carrying
//! `{component, component_type, operation, status}`.
//!
//! ## Contents
//! - [`Operation`], [`Status`], [`Event`] event classification and payload
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Worker`, `WorkerPool` (fan-outs, respawn protocol), `Orchestrator`.
//! - **Consumers**: `SubscriberSet` (fans out to user subscribers), or any raw
//!   `Bus::subscribe()` receiver.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, Operation, Status};
