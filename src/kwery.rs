//! The status-tracked entry returned by every query and mutation call.
//!
//! A [`Kwery`] is a handle to one shared, mutable record. Cloning the handle
//! does not copy the record: every clone observes the same status and data,
//! including updates applied later when an asynchronous invocation settles.
//!
//! # State machine
//!
//! ```text
//!            settle(Ok)
//!  Pending ─────────────► Success
//!     │  ▲                   │
//!     │  └──── refetch ──────┤
//!     │  ┌──── refetch ──────┘
//!     │  ▼
//!     └─────────────────────► Error
//!            settle(Err)
//! ```
//!
//! Synchronous operations settle before the entry is handed back, so callers
//! never observe `Pending` for them.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::dispatch::Executor;
use crate::error::KweryError;
use crate::operation::{Operation, Outcome};
use crate::signature::{Args, Signature};

/// The settlement state of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The invocation has not settled yet.
    Pending,
    /// The invocation resolved; data holds the value.
    Success,
    /// The invocation failed; data holds the reason.
    Error,
}

/// Every status, in lifecycle order.
pub const STATUSES: [Status; 3] = [Status::Pending, Status::Success, Status::Error];

impl Status {
    /// Returns the literal name of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Returns `true` while the invocation is in flight.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns `true` if the invocation resolved.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns `true` if the invocation failed.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = KweryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        STATUSES
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| KweryError::InvalidStatus(s.to_string()))
    }
}

/// A point-in-time copy of an entry's status and data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub status: Status,
    /// `None` until the first invocation settles.
    pub data: Option<Value>,
}

impl Snapshot {
    const fn pending() -> Self {
        Self {
            status: Status::Pending,
            data: None,
        }
    }

    /// Returns the data if the invocation succeeded, otherwise `None`.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self.status {
            Status::Success => self.data.as_ref(),
            _ => None,
        }
    }

    /// Returns the failure reason if the invocation failed, otherwise `None`.
    #[must_use]
    pub fn reason(&self) -> Option<&Value> {
        match self.status {
            Status::Error => self.data.as_ref(),
            _ => None,
        }
    }
}

/// Where an entry came from, and therefore whether it can be refetched.
pub(crate) enum Source {
    Query {
        signature: Signature,
        args: Args,
        operation: Operation,
        executor: Executor,
    },
    Mutation {
        name: String,
    },
}

struct Shared {
    state: watch::Sender<Snapshot>,
    source: Source,
}

/// A live, shared query or mutation entry.
///
/// Equality is identity: two handles are equal when they refer to the same entry.
#[derive(Clone)]
pub struct Kwery {
    shared: Arc<Shared>,
}

impl Kwery {
    /// Creates a pending entry.
    pub(crate) fn pending(source: Source) -> Self {
        let (state, _) = watch::channel(Snapshot::pending());
        Self {
            shared: Arc::new(Shared { state, source }),
        }
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> Status {
        self.shared.state.borrow().status
    }

    /// Returns the current data: the resolved value, the rejection reason, or
    /// `None` if nothing has settled yet.
    ///
    /// While a refetch is in flight this still holds the previous data.
    #[must_use]
    pub fn data(&self) -> Option<Value> {
        self.shared.state.borrow().data.clone()
    }

    /// Returns status and data read together.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.shared.state.borrow().clone()
    }

    /// Returns the name of the query or mutation this entry belongs to.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.shared.source {
            Source::Query { signature, .. } => signature.name(),
            Source::Mutation { name } => name,
        }
    }

    /// Returns the cache key of a query entry, or `None` for mutation entries.
    #[must_use]
    pub fn signature(&self) -> Option<&Signature> {
        match &self.shared.source {
            Source::Query { signature, .. } => Some(signature),
            Source::Mutation { .. } => None,
        }
    }

    /// Returns `true` if both handles refer to the same entry.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Invokes the query again with the arguments of the original call.
    ///
    /// The status resets to [`Status::Pending`] immediately. A synchronous query
    /// has settled again by the time this returns.
    ///
    /// # Errors
    ///
    /// Returns [`KweryError::NotRefetchable`] for mutation entries.
    pub fn refetch(&self) -> Result<Self, KweryError> {
        match &self.shared.source {
            Source::Query { args, .. } => Ok(self.run(args.clone())),
            Source::Mutation { name } => Err(KweryError::NotRefetchable(name.clone())),
        }
    }

    /// Invokes the query again with `args` in place of the original arguments.
    ///
    /// The entry keeps its cache key; only this invocation sees the new arguments.
    ///
    /// # Errors
    ///
    /// Returns [`KweryError::NotRefetchable`] for mutation entries and
    /// [`KweryError::KeyDerivation`] if `args` cannot be serialized.
    pub fn refetch_with(&self, args: impl serde::Serialize) -> Result<Self, KweryError> {
        let Source::Query { signature, .. } = &self.shared.source else {
            return Err(KweryError::NotRefetchable(self.name().to_string()));
        };
        let args = Args::new(args).map_err(|e| KweryError::KeyDerivation {
            name: signature.name().to_string(),
            reason: e.to_string(),
        })?;

        Ok(self.run(args))
    }

    /// Waits until the entry is no longer pending and returns its snapshot.
    ///
    /// Returns immediately if the entry has already settled.
    pub async fn settled(&self) -> Snapshot {
        let mut rx = self.shared.state.subscribe();
        match rx.wait_for(|snapshot| !snapshot.status.is_pending()).await {
            Ok(snapshot) => Snapshot::clone(&snapshot),
            Err(_) => self.snapshot(),
        }
    }

    fn run(&self, args: Args) -> Self {
        if let Source::Query {
            signature,
            operation,
            executor,
            ..
        } = &self.shared.source
        {
            trace!(signature = %signature, "Refetch resets entry to pending");
            self.reset();
            executor.execute(self, operation, args);
        }
        self.clone()
    }

    /// Starts a new invocation cycle, keeping the previous data.
    pub(crate) fn reset(&self) {
        self.shared.state.send_modify(|snapshot| {
            snapshot.status = Status::Pending;
        });
    }

    /// Applies the outcome of an invocation.
    ///
    /// There is no generation check: when invocations overlap, the one that
    /// settles last determines the final state.
    pub(crate) fn settle(&self, outcome: Outcome) {
        let (status, data) = match outcome {
            Ok(data) => (Status::Success, data),
            Err(reason) => (Status::Error, reason),
        };

        debug!(name = %self.name(), status = %status, "Entry settled");

        self.shared.state.send_modify(|snapshot| {
            snapshot.status = status;
            snapshot.data = Some(data);
        });
    }
}

impl PartialEq for Kwery {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Kwery {}

impl fmt::Debug for Kwery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("Kwery")
            .field("name", &self.name())
            .field("status", &snapshot.status)
            .field("data", &snapshot.data)
            .finish()
    }
}
