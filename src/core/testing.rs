//! Scripted receptors shared by the core unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::runtime::{FactoryFn, Runtime, RuntimeFactory};

/// Lifecycle call counters shared by every fake of one factory.
#[derive(Debug, Default)]
pub(crate) struct Calls {
    pub(crate) spawn: AtomicUsize,
    pub(crate) init: AtomicUsize,
    pub(crate) run: AtomicUsize,
    pub(crate) stop: AtomicUsize,
    /// Runs served by a receptor that was already stopped.
    pub(crate) stale_runs: AtomicUsize,
}

impl Calls {
    /// `(init, run, stop)`
    pub(crate) fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub(crate) fn snapshot(&self) -> (usize, usize, usize) {
        (
            self.init.load(Ordering::SeqCst),
            self.run.load(Ordering::SeqCst),
            self.stop.load(Ordering::SeqCst),
        )
    }
}

pub(crate) struct Fake {
    name: String,
    calls: Arc<Calls>,
    fail_init: bool,
    fail_run: bool,
    fail_stop: bool,
    /// Runs fail while fewer than this many runs were counted before.
    fail_first_runs: usize,
    stopped: AtomicBool,
}

impl Fake {
    pub(crate) fn new(name: &str) -> Self {
        Self::with_calls(name, Arc::default())
    }

    pub(crate) fn with_calls(name: &str, calls: Arc<Calls>) -> Self {
        Self {
            name: name.to_string(),
            calls,
            fail_init: false,
            fail_run: false,
            fail_stop: false,
            fail_first_runs: 0,
            stopped: AtomicBool::new(false),
        }
    }

    pub(crate) fn failing_run(mut self) -> Self {
        self.fail_run = true;
        self
    }

    pub(crate) fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub(crate) fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub(crate) fn failing_first_runs(mut self, n: usize) -> Self {
        self.fail_first_runs = n;
        self
    }

    pub(crate) fn calls(&self) -> Arc<Calls> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Runtime for Fake {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "fake"
    }

    async fn init(&self) -> Result<(), Error> {
        self.calls.init.fetch_add(1, Ordering::SeqCst);
        if self.fail_init {
            return Err(Error::init(format!("{} refused to init", self.name)));
        }
        Ok(())
    }

    async fn run(&self) -> Result<(), Error> {
        let before = self.calls.run.fetch_add(1, Ordering::SeqCst);
        if self.stopped.load(Ordering::SeqCst) {
            self.calls.stale_runs.fetch_add(1, Ordering::SeqCst);
        }
        tokio::task::yield_now().await;
        if self.fail_run || before < self.fail_first_runs {
            return Err(Error::run(format!("{} failed", self.name)));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), Error> {
        self.calls.stop.fetch_add(1, Ordering::SeqCst);
        self.stopped.store(true, Ordering::SeqCst);
        if self.fail_stop {
            return Err(Error::stop(format!("{} refused to stop", self.name)));
        }
        Ok(())
    }
}

/// Behavior of the fakes built by [`fake_factory`].
#[derive(Clone, Default)]
pub(crate) struct Script {
    pub(crate) calls: Arc<Calls>,
    /// Receptor names the factory refuses to build.
    pub(crate) fail_spawn: Vec<String>,
    pub(crate) fail_init: bool,
    pub(crate) fail_run: bool,
    pub(crate) fail_stop: bool,
    /// Shared across every receptor of the factory.
    pub(crate) fail_first_runs: usize,
}

pub(crate) fn fake_factory(script: Script) -> Arc<dyn RuntimeFactory> {
    FactoryFn::arc(move |name: String, _ctx: CancellationToken| {
        let script = script.clone();
        async move {
            script.calls.spawn.fetch_add(1, Ordering::SeqCst);
            if script.fail_spawn.contains(&name) {
                return Err(Error::spawn(format!("cannot build {name}")));
            }
            let mut fake = Fake::with_calls(&name, Arc::clone(&script.calls));
            if script.fail_init {
                fake = fake.failing_init();
            }
            if script.fail_run {
                fake = fake.failing_run();
            }
            if script.fail_stop {
                fake = fake.failing_stop();
            }
            fake = fake.failing_first_runs(script.fail_first_runs);
            Ok(fake)
        }
    })
}
