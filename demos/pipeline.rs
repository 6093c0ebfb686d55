//! # Example: Supervised pipeline
//!
//! Two pools under one orchestrator:
//! - `fetch`: 3 run-loop slots; each fetcher fails now and then and gets respawned.
//!   Fetchers compete for a `checkpoint` lease; only the holder writes it.
//! - `audit`: 1 run-once slot.
//!
//! Runs for 5 seconds (or until Ctrl-C), then shuts down gracefully.
//!
//! ```text
//! RUST_LOG=slotvisor=debug cargo run --example pipeline
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use slotvisor::{
    BackoffPolicy, Config, Error, EventLog, FactoryFn, InMemoryLeaser, Leaser, LeaserBuilder,
    Orchestrator, PoolSpec, RetryStrategy, RunOnce, Runtime, Subscribe,
};

struct Fetcher {
    name: String,
    leaser: Arc<InMemoryLeaser>,
    fetched: Arc<AtomicU64>,
}

#[async_trait]
impl Runtime for Fetcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "fetcher"
    }

    async fn init(&self) -> Result<(), Error> {
        println!("[{}] connected", self.name);
        Ok(())
    }

    async fn run(&self) -> Result<(), Error> {
        tokio::time::sleep(Duration::from_millis(300)).await;
        let n = self.fetched.fetch_add(1, Ordering::Relaxed) + 1;
        if n % 7 == 0 {
            return Err(Error::run(format!("upstream closed after batch {n}")));
        }
        if let Ok(expiry) = self.leaser.get_lease("checkpoint") {
            println!("[{}] checkpoint at batch {n} (lease until {expiry:?})", self.name);
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), Error> {
        println!("[{}] disconnected", self.name);
        Ok(())
    }
}

struct Auditor {
    name: String,
}

#[async_trait]
impl Runtime for Auditor {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "auditor"
    }

    async fn run(&self) -> Result<(), Error> {
        println!("[{}] audit passed", self.name);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slotvisor=info".into()),
        )
        .init();

    let cfg = Config {
        replicas: 3,
        grace: Duration::from_secs(2),
        respawn_backoff: BackoffPolicy::constant(Duration::from_millis(200)),
        ..Config::default()
    };

    let leaser = Arc::new(
        LeaserBuilder::from_config(&cfg)
            .lease_duration(Duration::from_secs(1))
            .build(),
    );
    let fetched = Arc::new(AtomicU64::new(0));

    let fetchers = FactoryFn::arc(move |name: String, _ctx: CancellationToken| {
        let leaser = Arc::clone(&leaser);
        let fetched = Arc::clone(&fetched);
        async move {
            Ok::<_, Error>(Fetcher {
                name,
                leaser,
                fetched,
            })
        }
    });
    let auditors = FactoryFn::arc(|name: String, _ctx: CancellationToken| async move {
        Ok::<_, Error>(Auditor { name })
    });

    let history = Arc::new(EventLog::new(4096));
    let mut subs: Vec<Arc<dyn Subscribe>> = vec![history.clone() as Arc<dyn Subscribe>];
    #[cfg(feature = "logging")]
    subs.push(Arc::new(slotvisor::LogWriter));

    let orch = Orchestrator::builder("pipeline", cfg.clone())
        .with_subscribers(subs)
        .with_worker_strategy(Arc::new(RetryStrategy::new(
            2,
            BackoffPolicy::constant(Duration::from_millis(50)),
        )))
        .with_pool(PoolSpec::with_defaults("fetch", fetchers, &cfg))
        .with_pool(PoolSpec::new("audit", 1, auditors, Arc::new(RunOnce)))
        .build();

    let token = orch.token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        token.cancel();
    });

    let result = orch.serve().await;

    let failures = history.drain().iter().filter(|e| e.is_failure()).count();
    println!("failure events observed: {failures}");
    if let Err(e) = &result {
        println!("{e}");
    }
    Ok(())
}
