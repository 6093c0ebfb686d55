//! Shared plumbing for the lifecycle layers: event bracketing and fan-out joins.

use std::future::Future;

use tokio::task::JoinSet;

use crate::error::{Error, Severity};
use crate::events::{Bus, Event, Operation, Status};

/// Runs `fut` between a `start` event and a `success`/`failed` event.
pub(crate) async fn observed<F>(
    bus: &Bus,
    component: &str,
    component_type: &str,
    op: Operation,
    fut: F,
) -> Result<(), Error>
where
    F: Future<Output = Result<(), Error>>,
{
    bus.lifecycle(component, component_type, op, Status::Start);
    let res = fut.await;
    match &res {
        Ok(()) => bus.lifecycle(component, component_type, op, Status::Success),
        Err(e) => bus.publish(
            Event::new(component, component_type, op, Status::Failed).with_reason(e.headline()),
        ),
    }
    res
}

/// Joins every unit of `set`, returning their errors in completion order.
///
/// A unit that panicked (or was aborted) becomes a `Runtime` error with
/// `Panic` severity; its siblings are unaffected.
pub(crate) async fn join_errors<T>(mut set: JoinSet<T>, unit: &str) -> Vec<Error>
where
    T: IntoIterator<Item = Error> + Send + 'static,
{
    let mut errors = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(errs) => errors.extend(errs),
            Err(join) => {
                tracing::error!(unit, error = %join, "fan-out unit did not complete");
                errors.push(
                    Error::runtime(format!("{unit} did not complete: {join}"))
                        .with_severity(Severity::Panic),
                );
            }
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn panicking_unit_is_isolated() {
        let mut set = JoinSet::new();
        set.spawn(async { None::<Error> });
        set.spawn(async { Some(Error::run("failed")) });
        set.spawn(async {
            if true {
                panic!("unit bug");
            }
            None::<Error>
        });

        let errors = join_errors(set, "slot").await;
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.severity() == Severity::Panic));
        assert!(errors.iter().any(|e| e.message() == "failed"));
    }

    #[tokio::test]
    async fn observed_brackets_the_operation() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        let res = observed(&bus, "w", "worker", Operation::Run, async { Err(Error::run("x")) }).await;
        assert!(res.is_err());

        assert_eq!(rx.recv().await.unwrap().status, Status::Start);
        let failed = rx.recv().await.unwrap();
        assert_eq!(failed.status, Status::Failed);
        assert_eq!(failed.reason.as_deref(), Some("RunError: x"));
    }
}
