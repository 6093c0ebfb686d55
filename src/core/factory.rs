use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::worker::Worker;
use crate::error::Error;
use crate::events::Bus;
use crate::runtime::{RuntimeFactory, Strategy};

/// Builds fresh [`Worker`]s for a pool.
///
/// The receptor is built by the injected [`RuntimeFactory`] under the name
/// `"<worker>-receptor"` and wrapped with the pool's shared strategy.
#[derive(Clone)]
pub struct WorkerFactory {
    receptors: Arc<dyn RuntimeFactory>,
    strategy: Arc<dyn Strategy>,
    bus: Bus,
}

impl WorkerFactory {
    pub fn new(receptors: Arc<dyn RuntimeFactory>, strategy: Arc<dyn Strategy>, bus: Bus) -> Self {
        Self {
            receptors,
            strategy,
            bus,
        }
    }

    /// Spawns a worker named `name`.
    ///
    /// A receptor failure yields no worker and a `Spawn` error caused by it.
    pub async fn spawn(&self, name: &str, ctx: CancellationToken) -> Result<Worker, Error> {
        let receptor_name = format!("{name}-receptor");
        let receptor = self
            .receptors
            .spawn(&receptor_name, ctx)
            .await
            .map_err(|e| Error::spawn(format!("unable to spawn {receptor_name}")).caused_by(e))?;
        Ok(Worker::new(name, Arc::clone(&self.strategy), receptor, self.bus.clone()))
    }
}
