//! # Kwery - a small query/mutation cache
//!
//! Kwery wraps named query and mutation functions so that calling them returns a
//! live, status-tracked entry instead of a raw value or future. It is a client-side
//! data-fetching cache in the spirit of SWR or TanStack Query, reduced to the core.
//!
//! ## Concepts
//!
//! 1. **Query**: a read-style operation; calls with equal arguments share one entry
//! 2. **Mutation**: a write-style operation; every call gets its own entry
//! 3. **Entry** ([`Kwery`]): a shared record holding a [`Status`] and data, updated
//!    in place when the underlying invocation settles
//! 4. **Refetch**: re-invoking a query against its existing entry
//!
//! ## Core Components
//!
//! - [`KweryConfig`]: the named operations of a client
//! - [`Client`]: an isolated cache with [`query`](Client::query) and
//!   [`mutate`](Client::mutate)
//! - [`Kweries`] / [`Mutations`]: the capability sets handed to selectors
//! - [`Kwery`]: the entry, with [`refetch`](Kwery::refetch) and
//!   [`settled`](Kwery::settled)
//! - [`query`] / [`mutate`]: free functions backed by a process-wide default client
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use kwery::{KweryConfig, Status, create_kwery};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = create_kwery(
//!         KweryConfig::new()
//!             .query_sync("request", |args| {
//!                 let id: String = args.parse(0).map_err(|e| json!(e.to_string()))?;
//!                 Ok(json!(format!("hello {id}")))
//!             })
//!             .query_async("slowRequest", |_| async {
//!                 tokio::time::sleep(Duration::from_millis(10)).await;
//!                 Ok(json!("This has resolved"))
//!             }),
//!     );
//!
//!     // Synchronous queries are settled on return.
//!     let greeting = client.query(|k| k.call("request", "person")).unwrap();
//!     assert_eq!(greeting.data(), Some(json!("hello person")));
//!
//!     // Asynchronous queries start pending and update in place.
//!     let slow = client.query(|k| k.get("slowRequest")).unwrap();
//!     assert_eq!(slow.status(), Status::Pending);
//!
//!     slow.settled().await;
//!     assert_eq!(slow.status(), Status::Success);
//!     assert_eq!(slow.data(), Some(json!("This has resolved")));
//!
//!     // Refetching reuses the same entry.
//!     greeting.refetch_with("world").unwrap();
//!     assert_eq!(greeting.data(), Some(json!("hello world")));
//! }
//! ```
//!
//! ## Overlapping invocations
//!
//! A refetch never cancels the invocation it supersedes. When both are in flight,
//! whichever settles last determines the entry's final status and data.

mod cache;
mod client;
mod config;
mod dispatch;
mod error;
mod global;
mod kwery;
mod operation;
pub mod prelude;
mod signature;

pub use client::{Client, create_kwery};
pub use config::KweryConfig;
pub use dispatch::{Capability, Kweries, MutationCapability, Mutations};
pub use error::KweryError;
pub use global::{default_client, init, mutate, query};
pub use kwery::{Kwery, STATUSES, Snapshot, Status};
pub use operation::{Invocation, Operation, Outcome};
pub use signature::{Args, Signature};
