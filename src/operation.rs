//! The contract between the cache and the functions it wraps.
//!
//! Every query and mutation is an [`Operation`]: a function from [`Args`] to an
//! [`Invocation`]. An invocation is either already settled ([`Invocation::Ready`])
//! or a future that settles later ([`Invocation::Pending`]). Both halves of an
//! [`Outcome`] carry a JSON value, which becomes the entry's data.
//!
//! # Example
//!
//! ```
//! use kwery::{Invocation, Operation};
//! use serde_json::json;
//!
//! // Settles immediately.
//! let greet = Operation::sync(|args| {
//!     let name: String = args.parse(0).map_err(|e| json!(e.to_string()))?;
//!     Ok(json!(format!("hello {name}")))
//! });
//!
//! // Settles when the future completes.
//! let fetch = Operation::future(|_args| async { Ok(json!({ "id": 1 })) });
//!
//! // Chooses per call.
//! let either = Operation::new(|args| {
//!     if args.is_empty() {
//!         Invocation::reject("missing id")
//!     } else {
//!         Invocation::resolve(args.get(0).cloned().unwrap_or_default())
//!     }
//! });
//! # let _ = (greet, fetch, either);
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use tracing::warn;

use crate::signature::Args;

/// The settled result of an operation: `Ok(data)` or `Err(reason)`.
pub type Outcome = Result<Value, Value>;

/// What calling an operation produced.
pub enum Invocation {
    /// The operation settled synchronously.
    Ready(Outcome),
    /// The operation settles when the future completes.
    Pending(BoxFuture<'static, Outcome>),
}

impl Invocation {
    /// A synchronous success.
    pub fn resolve(data: impl Into<Value>) -> Self {
        Self::Ready(Ok(data.into()))
    }

    /// A synchronous failure.
    pub fn reject(reason: impl Into<Value>) -> Self {
        Self::Ready(Err(reason.into()))
    }

    /// An asynchronous invocation.
    pub fn future(future: impl Future<Output = Outcome> + Send + 'static) -> Self {
        Self::Pending(future.boxed())
    }

    /// Returns `true` if this invocation has already settled.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

impl From<Outcome> for Invocation {
    fn from(outcome: Outcome) -> Self {
        Self::Ready(outcome)
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(outcome) => f.debug_tuple("Ready").field(outcome).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

type OperationFn = dyn Fn(Args) -> Invocation + Send + Sync;

/// A named query or mutation body.
///
/// Operations are shared between the client, its capability sets and every
/// entry that may refetch, so they are reference counted and cheap to clone.
#[derive(Clone)]
pub struct Operation {
    inner: Arc<OperationFn>,
}

impl Operation {
    /// Wraps a function that decides per call whether to settle now or later.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Args) -> Invocation + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Wraps a synchronous function.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(Args) -> Outcome + Send + Sync + 'static,
    {
        Self::new(move |args| Invocation::Ready(f(args)))
    }

    /// Wraps an asynchronous function.
    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        Self::new(move |args| Invocation::future(f(args)))
    }

    /// Calls the operation.
    ///
    /// A panic, whether raised by the call itself or while polling the returned
    /// future, is turned into an `Err` carrying the panic message.
    pub(crate) fn invoke(&self, args: Args) -> Invocation {
        match catch_unwind(AssertUnwindSafe(|| (self.inner)(args))) {
            Ok(Invocation::Ready(outcome)) => Invocation::Ready(outcome),
            Ok(Invocation::Pending(future)) => Invocation::Pending(
                AssertUnwindSafe(future)
                    .catch_unwind()
                    .map(|result| result.unwrap_or_else(|payload| Err(panic_reason(&*payload))))
                    .boxed(),
            ),
            Err(payload) => Invocation::Ready(Err(panic_reason(&*payload))),
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation").finish_non_exhaustive()
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> Value {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "operation panicked".to_string());

    warn!(reason = %message, "Operation panicked");
    Value::String(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invocation_constructors() {
        assert!(Invocation::resolve("ok").is_ready());
        assert!(Invocation::reject("no").is_ready());
        assert!(!Invocation::future(async { Ok(json!(1)) }).is_ready());

        match Invocation::from(Err(json!("bad"))) {
            Invocation::Ready(Err(reason)) => assert_eq!(reason, json!("bad")),
            other => panic!("unexpected invocation: {other:?}"),
        }
    }

    #[test]
    fn test_sync_operation() {
        let op = Operation::sync(|args| Ok(json!(args.len())));
        match op.invoke(Args::new((1, 2)).expect("args")) {
            Invocation::Ready(Ok(data)) => assert_eq!(data, json!(2)),
            other => panic!("unexpected invocation: {other:?}"),
        }
    }

    #[test]
    fn test_sync_panic_is_captured() {
        let op = Operation::sync(|_| panic!("boom"));
        match op.invoke(Args::empty()) {
            Invocation::Ready(Err(reason)) => assert_eq!(reason, json!("boom")),
            other => panic!("unexpected invocation: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_future_operation() {
        let op = Operation::future(|args| async move { Ok(args.get(0).cloned().unwrap_or_default()) });
        match op.invoke(Args::new("hello").expect("args")) {
            Invocation::Pending(future) => assert_eq!(future.await, Ok(json!("hello"))),
            other => panic!("unexpected invocation: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_future_panic_is_captured() {
        let op = Operation::future(|_| async {
            let missing: Option<Value> = None;
            Ok(missing.expect("value should be present"))
        });
        match op.invoke(Args::empty()) {
            Invocation::Pending(future) => {
                assert_eq!(future.await, Err(json!("value should be present")));
            }
            other => panic!("unexpected invocation: {other:?}"),
        }
    }
}
