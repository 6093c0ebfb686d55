//! # Receptor factories.
//!
//! A [`RuntimeFactory`] builds a fresh receptor for a given name every time a
//! pool spawns or respawns a slot. [`FactoryFn`] wraps a closure, so most
//! embedders never implement the trait by hand.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use slotvisor::{Error, FactoryFn, Runtime, RuntimeFactory};
//!
//! struct Ticker {
//!     name: String,
//! }
//!
//! #[async_trait]
//! impl Runtime for Ticker {
//!     fn name(&self) -> &str { &self.name }
//!     fn kind(&self) -> &str { "ticker" }
//!     async fn run(&self) -> Result<(), Error> { Ok(()) }
//! }
//!
//! let factory: Arc<dyn RuntimeFactory> =
//!     FactoryFn::arc(|name: String, _ctx: CancellationToken| async move {
//!         Ok::<_, Error>(Ticker { name })
//!     });
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::runtime::Runtime;

/// Builds receptors on demand.
#[async_trait]
pub trait RuntimeFactory: Send + Sync + 'static {
    /// Builds a new runtime named `name`.
    ///
    /// `ctx` is the owning pool's cancellation token; receptors may keep it to
    /// notice shutdown from inside long calls.
    async fn spawn(&self, name: &str, ctx: CancellationToken) -> Result<Box<dyn Runtime>, Error>;
}

/// Closure-backed [`RuntimeFactory`].
///
/// The closure is called once per spawn and gets an owned name and token.
pub struct FactoryFn<F> {
    f: F,
}

impl<F> FactoryFn<F> {
    pub fn new<Fut, R>(f: F) -> Self
    where
        F: Fn(String, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Error>> + Send + 'static,
        R: Runtime,
    {
        Self { f }
    }

    /// Creates the factory as a shared handle.
    pub fn arc<Fut, R>(f: F) -> Arc<Self>
    where
        F: Fn(String, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Error>> + Send + 'static,
        R: Runtime,
    {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut, R> RuntimeFactory for FactoryFn<F>
where
    F: Fn(String, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
    R: Runtime,
{
    async fn spawn(&self, name: &str, ctx: CancellationToken) -> Result<Box<dyn Runtime>, Error> {
        let runtime = (self.f)(name.to_string(), ctx).await?;
        Ok(Box::new(runtime))
    }
}
