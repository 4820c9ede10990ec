//! Turning configured operations into tracked entries.
//!
//! Selectors passed to [`Client::query`](crate::Client::query) and
//! [`Client::mutate`](crate::Client::mutate) receive a capability set:
//! [`Kweries`] for queries and [`Mutations`] for mutations. Each configured name
//! is reachable as a [`Capability`] that can be read as its zero-argument entry
//! or called with arguments.
//!
//! # Query path
//!
//! 1. Derive the [`Signature`](crate::Signature) of `(name, args)`
//! 2. Return the cached entry if one exists
//! 3. Otherwise store a new pending entry, invoke the operation and wire its
//!    settlement back into that entry
//!
//! # Mutation path
//!
//! Every call creates a fresh entry and invokes the operation. Nothing is cached.

mod mutation;
mod query;

pub use mutation::{MutationCapability, Mutations};
pub use query::{Capability, Kweries};

use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::kwery::Kwery;
use crate::operation::{Invocation, Operation, Outcome};
use crate::signature::Args;

const DROPPED_REASON: &str = "invocation dropped before settling";

/// Runs operations and settles entries with their outcome.
///
/// Asynchronous invocations are spawned onto the configured runtime handle, or
/// the ambient tokio runtime when none was configured.
#[derive(Debug, Clone, Default)]
pub(crate) struct Executor {
    runtime: Option<Handle>,
}

impl Executor {
    pub(crate) const fn new(runtime: Option<Handle>) -> Self {
        Self { runtime }
    }

    /// Invokes `operation` and wires its outcome into `kwery`.
    ///
    /// Synchronous outcomes are applied before this returns.
    pub(crate) fn execute(&self, kwery: &Kwery, operation: &Operation, args: Args) {
        debug!(name = %kwery.name(), args = args.len(), "Invoking operation");

        match operation.invoke(args) {
            Invocation::Ready(outcome) => kwery.settle(outcome),
            Invocation::Pending(future) => {
                let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok())
                else {
                    warn!(name = %kwery.name(), "No tokio runtime to drive the operation");
                    kwery.settle(Err(Value::String(
                        "no tokio runtime available to drive the operation".to_string(),
                    )));
                    return;
                };

                // The guard lives in the task, so a task the runtime drops
                // unpolled or mid-flight still settles the entry.
                let settlement = Settlement::new(kwery.clone());
                runtime.spawn(async move {
                    let outcome = future.await;
                    settlement.complete(outcome);
                });
            }
        }
    }
}

/// Settles an entry exactly once, with an error if dropped before completion.
struct Settlement {
    kwery: Option<Kwery>,
}

impl Settlement {
    const fn new(kwery: Kwery) -> Self {
        Self { kwery: Some(kwery) }
    }

    fn complete(mut self, outcome: Outcome) {
        if let Some(kwery) = self.kwery.take() {
            kwery.settle(outcome);
        }
    }
}

impl Drop for Settlement {
    fn drop(&mut self) {
        if let Some(kwery) = self.kwery.take() {
            warn!(name = %kwery.name(), "Invocation dropped before settling");
            kwery.settle(Err(Value::String(DROPPED_REASON.to_string())));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kwery::{Source, Status};
    use serde_json::json;

    fn entry() -> Kwery {
        Kwery::pending(Source::Mutation {
            name: "op".to_string(),
        })
    }

    #[test]
    fn test_ready_settles_immediately() {
        let kwery = entry();
        Executor::default().execute(&kwery, &Operation::sync(|_| Ok(json!("now"))), Args::empty());

        assert_eq!(kwery.status(), Status::Success);
        assert_eq!(kwery.data(), Some(json!("now")));
    }

    #[test]
    fn test_pending_without_runtime_settles_error() {
        let kwery = entry();
        let operation = Operation::future(|_| async { Ok(json!("never")) });
        Executor::default().execute(&kwery, &operation, Args::empty());

        assert_eq!(kwery.status(), Status::Error);
        assert_eq!(
            kwery.data(),
            Some(json!("no tokio runtime available to drive the operation"))
        );
    }

    #[test]
    fn test_pending_uses_configured_runtime() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .build()
            .expect("runtime should build");

        let kwery = entry();
        let operation = Operation::future(|_| async { Ok(json!("later")) });
        Executor::new(Some(runtime.handle().clone())).execute(&kwery, &operation, Args::empty());

        let snapshot = runtime.block_on(kwery.settled());
        assert_eq!(snapshot.status, Status::Success);
        assert_eq!(snapshot.data, Some(json!("later")));
    }

    #[test]
    fn test_pending_on_shut_down_runtime_settles_error() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime should build");
        let handle = runtime.handle().clone();
        drop(runtime);

        let kwery = entry();
        let operation = Operation::future(|_| async { Ok(json!("never")) });
        Executor::new(Some(handle)).execute(&kwery, &operation, Args::empty());

        assert_eq!(kwery.status(), Status::Error);
        assert_eq!(kwery.data(), Some(json!(DROPPED_REASON)));
    }

    #[test]
    fn test_task_dropped_mid_flight_settles_error() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime should build");

        let kwery = entry();
        let operation = Operation::future(|_| std::future::pending());
        Executor::new(Some(runtime.handle().clone())).execute(&kwery, &operation, Args::empty());
        assert_eq!(kwery.status(), Status::Pending);

        drop(runtime);

        assert_eq!(kwery.status(), Status::Error);
        assert_eq!(kwery.data(), Some(json!(DROPPED_REASON)));
    }

    #[tokio::test]
    async fn test_pending_uses_ambient_runtime() {
        let kwery = entry();
        let operation = Operation::future(|_| async { Err(json!("rejected")) });
        Executor::default().execute(&kwery, &operation, Args::empty());

        assert_eq!(kwery.status(), Status::Pending);

        let snapshot = kwery.settled().await;
        assert_eq!(snapshot.status, Status::Error);
        assert_eq!(snapshot.data, Some(json!("rejected")));
    }
}
