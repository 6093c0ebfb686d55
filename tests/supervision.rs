use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use slotvisor::{
    BackoffPolicy, Config, Error, ErrorKind, EventLog, FactoryFn, Leaser, LeaserBuilder,
    Operation, Orchestrator, PoolSpec, RetryStrategy, RunLoop, RunOnce, Runtime, RuntimeFactory,
    Status, Subscribe,
};

#[derive(Default)]
struct Counters {
    spawned: AtomicUsize,
    runs: AtomicUsize,
    stops: AtomicUsize,
}

/// Receptor whose `run` fails on every `fail_every`-th call (0 = never).
struct Scripted {
    name: String,
    counters: Arc<Counters>,
    fail_every: usize,
}

#[async_trait]
impl Runtime for Scripted {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "scripted"
    }

    async fn run(&self) -> Result<(), Error> {
        let n = self.counters.runs.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::task::yield_now().await;
        if self.fail_every != 0 && n % self.fail_every == 0 {
            return Err(Error::run(format!("{} failed run {n}", self.name)));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), Error> {
        self.counters.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn scripted(counters: &Arc<Counters>, fail_every: usize, refuse: &[&str]) -> Arc<dyn RuntimeFactory> {
    let counters = Arc::clone(counters);
    let refuse: Vec<String> = refuse.iter().map(|s| s.to_string()).collect();
    FactoryFn::arc(move |name: String, _ctx: CancellationToken| {
        let counters = Arc::clone(&counters);
        let refused = refuse.contains(&name);
        async move {
            if refused {
                return Err(Error::spawn(format!("{name} refused")));
            }
            counters.spawned.fetch_add(1, Ordering::SeqCst);
            Ok(Scripted {
                name,
                counters,
                fail_every,
            })
        }
    })
}

#[tokio::test]
async fn orchestrator_reports_exactly_the_failing_pools() {
    let counters = Arc::new(Counters::default());
    let mut builder = Orchestrator::builder("o", Config::default());
    for (i, fail_every) in [0, 1, 0, 0, 1].into_iter().enumerate() {
        builder = builder.with_pool(PoolSpec::new(
            format!("pool{i}"),
            3,
            scripted(&counters, fail_every, &[]),
            Arc::new(RunOnce),
        ));
    }
    let orch = builder.build();

    orch.init().await.unwrap();
    let err = orch.run().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ErrorList);
    assert_eq!(err.sub_errors().len(), 2);
    assert_eq!(counters.runs.load(Ordering::SeqCst), 15);
    assert!(err.to_string().starts_with("ErrorList: orchestrator o: run (2 errors)"));
}

#[tokio::test]
async fn one_refused_slot_leaves_the_others_initialized() {
    let counters = Arc::new(Counters::default());
    let orch = Orchestrator::builder("o", Config::default())
        .with_pool(PoolSpec::new(
            "p",
            5,
            scripted(&counters, 0, &["p-2-receptor"]),
            Arc::new(RunOnce),
        ))
        .build();

    let err = orch.init().await.unwrap_err();

    let pool = orch.pool(0).unwrap();
    assert_eq!(pool.occupied(), 4);
    assert!(pool.worker(2).is_none());
    assert_eq!(err.count_failures(), 1);
    assert_eq!(err.sub_errors()[0].sub_errors().len(), 1);
    assert_eq!(err.sub_errors()[0].sub_errors()[0].kind(), ErrorKind::Spawn);
}

#[tokio::test]
async fn lifecycle_events_are_published_at_every_layer() {
    let counters = Arc::new(Counters::default());
    let orch = Orchestrator::builder("o", Config::default())
        .with_pool(PoolSpec::new("p", 1, scripted(&counters, 0, &[]), Arc::new(RunOnce)))
        .build();
    let mut rx = orch.events().subscribe();

    orch.init().await.unwrap();
    orch.run().await.unwrap();
    orch.stop().await.unwrap();

    let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
    for (component, component_type) in [("o", "orchestrator"), ("p", "worker-pool"), ("p-0", "worker")] {
        for op in [Operation::Init, Operation::Run, Operation::Stop] {
            for status in [Status::Start, Status::Success] {
                assert!(
                    events.iter().any(|e| &*e.component == component
                        && &*e.component_type == component_type
                        && e.operation == op
                        && e.status == status),
                    "missing {component} {op} {status}"
                );
            }
        }
    }
}

#[tokio::test]
async fn subscribers_receive_failures() {
    let log = Arc::new(EventLog::new(256));
    let counters = Arc::new(Counters::default());
    let orch = Orchestrator::builder("o", Config::default())
        .with_subscribers(vec![log.clone() as Arc<dyn Subscribe>])
        .with_pool(PoolSpec::new("p", 2, scripted(&counters, 1, &[]), Arc::new(RunOnce)))
        .build();

    orch.init().await.unwrap();
    orch.run().await.unwrap_err();

    let seen = tokio::time::timeout(Duration::from_secs(5), async {
        let mut failures = 0;
        while failures < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            failures += log
                .drain()
                .iter()
                .filter(|e| {
                    e.is_failure() && e.operation == Operation::Run && &*e.component_type == "worker"
                })
                .count();
        }
        failures
    })
    .await
    .unwrap();
    assert_eq!(seen, 2);
}

#[tokio::test(start_paused = true)]
async fn run_loop_recovers_from_failures_until_cancelled() {
    let counters = Arc::new(Counters::default());
    let cfg = Config {
        respawn_backoff: BackoffPolicy::constant(Duration::from_millis(100)),
        ..Config::default()
    };
    let orch = Orchestrator::builder("o", cfg)
        .with_pool(PoolSpec::new("p", 2, scripted(&counters, 3, &[]), Arc::new(RunLoop)))
        .build();

    let running = tokio::spawn({
        let orch = orch.clone();
        async move { orch.run().await }
    });
    tokio::time::sleep(Duration::from_secs(2)).await;
    orch.shutdown().await.unwrap();
    let _ = running.await.unwrap();

    let spawned = counters.spawned.load(Ordering::SeqCst);
    assert!(counters.runs.load(Ordering::SeqCst) > 10);
    assert!(spawned > 2, "failed slots should have been respawned, spawned {spawned}");
}

#[tokio::test(start_paused = true)]
async fn retry_strategy_absorbs_transient_failures() {
    let counters = Arc::new(Counters::default());
    let orch = Orchestrator::builder("o", Config::default())
        .with_worker_strategy(Arc::new(RetryStrategy::new(
            2,
            BackoffPolicy::constant(Duration::from_millis(10)),
        )))
        .with_pool(PoolSpec::new("p", 1, scripted(&counters, 2, &[]), Arc::new(RunOnce)))
        .build();

    orch.init().await.unwrap();
    orch.run().await.unwrap();
    orch.run().await.unwrap();

    assert_eq!(counters.runs.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn one_concurrent_leaseholder() {
    let leaser = Arc::new(LeaserBuilder::new().lease_duration(Duration::from_secs(10)).build());

    let mut set = tokio::task::JoinSet::new();
    for _ in 0..32 {
        let leaser = Arc::clone(&leaser);
        set.spawn(async move { leaser.get_lease("leader").is_ok() });
    }
    let granted = set.join_all().await.into_iter().filter(|ok| *ok).count();
    assert_eq!(granted, 1);

    tokio::time::advance(Duration::from_secs(10)).await;
    assert!(leaser.get_lease("leader").is_ok());
}
