//! # Lifecycle events emitted by workers, pools and orchestrators.
//!
//! ## Ordering guarantees
//! Each event has a process-wide sequence number (`seq`) that increases
//! monotonically. Sibling slots run in parallel, so only `seq` (not delivery
//! order) restores the exact order of publication.
//!
//! ## Example
//! ```rust
//! use slotvisor::{Event, Operation, Status};
//!
//! let ev = Event::new("ingest-0", "worker", Operation::Run, Status::Failed)
//!     .with_slot(0)
//!     .with_reason("RunError: upstream closed");
//!
//! assert!(ev.is_failure());
//! assert_eq!(ev.operation.as_str(), "run");
//! assert_eq!(ev.slot, Some(0));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Lifecycle operation an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Init,
    Run,
    Stop,
    HandleError,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Init => "init",
            Operation::Run => "run",
            Operation::Stop => "stop",
            Operation::HandleError => "handle-error",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Operation entered.
    Start,
    /// Intermediate step (spawn, eviction, respawn, shutdown request, ...).
    Progress,
    /// Operation returned `Ok(())`.
    Success,
    /// Operation returned an error.
    Failed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Start => "start",
            Status::Progress => "progress",
            Status::Success => "success",
            Status::Failed => "failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Name of the component (worker, pool or orchestrator name).
    pub component: Arc<str>,
    /// Component type (`"worker"`, `"worker-pool"`, `"orchestrator"`, ...).
    pub component_type: Arc<str>,
    pub operation: Operation,
    pub status: Status,
    /// Slot index, for pool events that concern one slot.
    pub slot: Option<usize>,
    /// Human-readable detail (error headline, progress note).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates an event with the current timestamp and next sequence number.
    pub fn new(
        component: impl Into<Arc<str>>,
        component_type: impl Into<Arc<str>>,
        operation: Operation,
        status: Status,
    ) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            component: component.into(),
            component_type: component_type.into(),
            operation,
            status,
            slot: None,
            reason: None,
        }
    }

    #[inline]
    pub fn with_slot(mut self, slot: usize) -> Self {
        self.slot = Some(slot);
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self.status, Status::Failed)
    }
}
