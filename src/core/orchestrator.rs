//! # Orchestrator: top-level fan-out over worker pools.
//!
//! ```text
//!                 Orchestrator::run
//!                        │ (one unit per pool, joined)
//!          ┌─────────────┼─────────────┐
//!  Strategy::run(pool)  ...   Strategy::run(pool)
//!          │                           │
//!   WorkerPool::run             WorkerPool::run
//!   (one unit per slot)         (one unit per slot)
//! ```
//!
//! Errors flow back up the same path: each pool composes its slots' errors,
//! the orchestrator composes the pools' errors.
//!
//! ## Shutdown
//! [`Orchestrator::serve`] runs everything until an OS signal or
//! [`Orchestrator::shutdown`]/token cancellation, then waits up to
//! `Config::grace` for run-loops to exit and stops every pool.
//!
//! Both `serve` and [`Orchestrator::shutdown`] end by closing the subscribers:
//! every event published so far is delivered, and nothing published later is.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::builder::OrchestratorBuilder;
use super::fanout::{join_errors, observed};
use super::pool::WorkerPool;
use super::shutdown;
use super::spec::PoolSpec;
use crate::collections::SafeArray;
use crate::config::Config;
use crate::error::{Error, ErrorKind, Severity, aggregate};
use crate::events::{Bus, Event, Operation, Status};
use crate::runtime::{Runtime, Strategy};
use crate::subscribers::Listener;

const ORCHESTRATOR: &str = "orchestrator";

/// Owns worker pools and drives them in parallel.
///
/// Built with [`Orchestrator::builder`]. Cloning is cheap and yields a handle
/// to the same orchestrator.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    cfg: Config,
    pools: SafeArray<WorkerPool>,
    strategy: Arc<dyn Strategy>,
    worker_strategy: Arc<dyn Strategy>,
    token: CancellationToken,
    bus: Bus,
    subscribers: Mutex<Option<Listener>>,
}

impl Orchestrator {
    pub fn builder(name: impl Into<String>, cfg: Config) -> OrchestratorBuilder {
        OrchestratorBuilder::new(name, cfg)
    }

    pub(crate) fn new_internal(
        name: String,
        cfg: Config,
        strategy: Arc<dyn Strategy>,
        worker_strategy: Arc<dyn Strategy>,
        bus: Bus,
        listener: Option<Listener>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                cfg,
                pools: SafeArray::new(),
                strategy,
                worker_strategy,
                token: CancellationToken::new(),
                bus,
                subscribers: Mutex::new(listener),
            }),
        }
    }

    /// Builds a pool from `spec` and appends it.
    ///
    /// The pool shares this orchestrator's bus and worker strategy; its token
    /// is a child of the orchestrator's token.
    pub fn add_pool(&self, spec: PoolSpec) -> WorkerPool {
        let pool = WorkerPool::new(
            spec,
            Arc::clone(&self.inner.worker_strategy),
            self.inner.cfg.respawn_backoff,
            self.inner.bus.clone(),
            self.inner.token.child_token(),
        );
        self.inner.pools.append(pool.clone());
        pool
    }

    /// Number of pools.
    pub fn pools(&self) -> usize {
        self.inner.pools.len()
    }

    pub fn pool(&self, index: usize) -> Option<WorkerPool> {
        self.inner.pools.get(index)
    }

    pub fn config(&self) -> &Config {
        &self.inner.cfg
    }

    /// Root cancellation token; cancelling it ends every run-loop.
    pub fn token(&self) -> CancellationToken {
        self.inner.token.clone()
    }

    /// Event bus shared by every pool and worker.
    pub fn events(&self) -> &Bus {
        &self.inner.bus
    }

    /// Cancels every pool, stops them, then closes the subscribers.
    pub async fn shutdown(&self) -> Result<(), Error> {
        self.inner.token.cancel();
        let res = self.stop().await;
        self.close_subscribers().await;
        res
    }

    /// Runs the orchestrator until shutdown is requested.
    ///
    /// 1. `init` every pool;
    /// 2. `run` every pool in the background;
    /// 3. wait for an OS signal, token cancellation, or the run fan-out ending on its own;
    /// 4. cancel, then wait up to the grace period for the run fan-out to join;
    /// 5. `stop` every pool;
    /// 6. deliver the remaining events to the subscribers and close them.
    ///
    /// Returns the composite of every error observed along the way. Exceeding
    /// the grace period adds a `ShutdownError`.
    pub async fn serve(&self) -> Result<(), Error> {
        let mut errors = Vec::new();
        if let Err(e) = self.init().await {
            errors.push(e);
        }

        let mut running = tokio::spawn({
            let this = self.clone();
            async move { this.run().await }
        });

        let finished = tokio::select! {
            res = &mut running => Some(res),
            reason = self.shutdown_requested() => {
                tracing::info!(orchestrator = %self.inner.name, reason, "shutdown requested");
                self.inner.bus.publish(
                    Event::new(self.name(), ORCHESTRATOR, Operation::Stop, Status::Progress)
                        .with_reason(format!("shutdown requested: {reason}")),
                );
                None
            }
        };
        self.inner.token.cancel();

        let joined = match finished {
            Some(res) => Some(res),
            None => match self.inner.cfg.grace_period() {
                Some(grace) => match tokio::time::timeout(grace, &mut running).await {
                    Ok(res) => Some(res),
                    Err(_elapsed) => {
                        running.abort();
                        errors.push(grace_exceeded(grace));
                        None
                    }
                },
                None => {
                    running.abort();
                    None
                }
            },
        };
        match joined {
            Some(Ok(Err(e))) => errors.push(e),
            Some(Err(join)) => errors.push(
                Error::runtime(format!("run fan-out did not complete: {join}"))
                    .with_severity(Severity::Panic),
            ),
            Some(Ok(Ok(()))) | None => {}
        }

        if let Err(e) = self.stop().await {
            errors.push(e);
        }
        let res = aggregate(format!("{ORCHESTRATOR} {}: serve", self.name()), errors);
        self.close_subscribers().await;
        res
    }

    /// Flushes and closes the subscribers; later calls are no-ops.
    async fn close_subscribers(&self) {
        let listener = self.inner.subscribers.lock().take();
        if let Some(listener) = listener {
            tracing::debug!(orchestrator = %self.inner.name, "closing subscribers");
            listener.close().await;
        }
    }

    async fn shutdown_requested(&self) -> &'static str {
        let token = self.token();
        tokio::select! {
            _ = token.cancelled() => "cancelled",
            signal = shutdown::wait_for_signal() => match signal {
                Ok(name) => name,
                Err(e) => {
                    tracing::warn!(error = %e, "signal handlers unavailable, waiting for cancellation");
                    token.cancelled().await;
                    "cancelled"
                }
            },
        }
    }

    async fn fan_out(&self, op: Operation) -> Result<(), Error> {
        let fut = async {
            let mut set = JoinSet::new();
            for pool in self.inner.pools.to_vec() {
                let strategy = Arc::clone(&self.inner.strategy);
                set.spawn(async move {
                    let res = match op {
                        Operation::Init => strategy.init(&pool).await,
                        Operation::Run => strategy.run(&pool).await,
                        Operation::Stop => strategy.stop(&pool).await,
                        Operation::HandleError => Ok(()),
                    };
                    res.err()
                });
            }
            let errors = join_errors(set, "pool").await;
            aggregate(format!("{ORCHESTRATOR} {}: {op}", self.name()), errors)
        };
        observed(&self.inner.bus, self.name(), ORCHESTRATOR, op, fut).await
    }
}

fn grace_exceeded(grace: Duration) -> Error {
    Error::new(
        ErrorKind::Shutdown,
        format!("run-loops still active after grace period of {grace:?}"),
    )
}

#[async_trait]
impl Runtime for Orchestrator {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn kind(&self) -> &str {
        ORCHESTRATOR
    }

    fn bus(&self) -> Option<&Bus> {
        Some(&self.inner.bus)
    }

    async fn init(&self) -> Result<(), Error> {
        self.fan_out(Operation::Init).await
    }

    async fn run(&self) -> Result<(), Error> {
        self.fan_out(Operation::Run).await
    }

    async fn stop(&self) -> Result<(), Error> {
        self.fan_out(Operation::Stop).await
    }

    /// Reserved hook: never invoked by the orchestrator itself.
    async fn handle_error(&self, _err: Error) -> Result<(), Error> {
        Ok(())
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("name", &self.inner.name)
            .field("pools", &self.pools())
            .finish()
    }
}
