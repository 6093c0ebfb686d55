//! # Logging subscriber.
//!
//! [`LogWriter`] forwards lifecycle events to [`tracing`] with structured fields:
//! ```text
//! DEBUG component=ingest-0 component_type=worker operation=run status=start
//! WARN  component=ingest component_type=worker-pool operation=run status=failed slot=3 reason="RunError: upstream closed"
//! INFO  component=ingest component_type=worker-pool operation=run status=progress slot=3 reason="respawning worker"
//! ```
//!
//! Install a `tracing` subscriber (e.g. `tracing_subscriber::fmt`) in the
//! embedding application to see the output.

use async_trait::async_trait;

use crate::events::{Event, Status};
use crate::subscribers::Subscribe;

/// Subscriber emitting one `tracing` event per lifecycle event.
///
/// Levels: `failed` → WARN, `progress` → INFO, `start`/`success` → DEBUG.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let reason = e.reason.as_deref().unwrap_or_default();
        match e.status {
            Status::Failed => tracing::warn!(
                seq = e.seq,
                component = %e.component,
                component_type = %e.component_type,
                operation = e.operation.as_str(),
                status = e.status.as_str(),
                slot = ?e.slot,
                reason,
                "lifecycle event"
            ),
            Status::Progress => tracing::info!(
                seq = e.seq,
                component = %e.component,
                component_type = %e.component_type,
                operation = e.operation.as_str(),
                status = e.status.as_str(),
                slot = ?e.slot,
                reason,
                "lifecycle event"
            ),
            Status::Start | Status::Success => tracing::debug!(
                seq = e.seq,
                component = %e.component,
                component_type = %e.component_type,
                operation = e.operation.as_str(),
                status = e.status.as_str(),
                slot = ?e.slot,
                "lifecycle event"
            ),
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
