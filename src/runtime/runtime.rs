use async_trait::async_trait;

use crate::error::Error;
use crate::events::Bus;

/// # Lifecycle contract of a unit of work.
///
/// The supervision core never looks inside a runtime: it calls these four
/// operations and reacts to their results.
///
/// - `init` prepares the unit (connections, buffers, ...);
/// - `run` performs one execution (a run-loop calls it repeatedly);
/// - `stop` releases what `init` acquired;
/// - `handle_error` gets the error of a failed `run`. Returning `Ok(())`
///   absorbs it; returning an error (the default re-raises) reports it upward.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use slotvisor::{Error, Runtime};
///
/// struct Echo {
///     name: String,
/// }
///
/// #[async_trait]
/// impl Runtime for Echo {
///     fn name(&self) -> &str { &self.name }
///     fn kind(&self) -> &str { "echo" }
///
///     async fn run(&self) -> Result<(), Error> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Runtime: Send + Sync + 'static {
    /// Instance name, unique within its parent.
    fn name(&self) -> &str;

    /// Component type (`"worker"`, `"worker-pool"`, a receptor's own label, ...).
    fn kind(&self) -> &str;

    /// Event bus this runtime publishes to, if any.
    fn bus(&self) -> Option<&Bus> {
        None
    }

    async fn init(&self) -> Result<(), Error> {
        Ok(())
    }

    async fn run(&self) -> Result<(), Error>;

    async fn stop(&self) -> Result<(), Error> {
        Ok(())
    }

    async fn handle_error(&self, err: Error) -> Result<(), Error> {
        Err(err)
    }
}
