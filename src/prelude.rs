//! Prelude module for convenient imports.
//!
//! ```
//! use kwery::prelude::*;
//! ```
//!
//! # What's included
//!
//! - [`create_kwery`] and [`KweryConfig`] - Building a client
//! - [`Client`] - The cache and its dispatchers
//! - [`Kwery`], [`Status`] and [`STATUSES`] - Entries and their state
//! - [`Invocation`] and [`Operation`] - Writing queries and mutations
//! - [`query`] and [`mutate`] - The default client's free functions

pub use crate::client::{Client, create_kwery};
pub use crate::config::KweryConfig;
pub use crate::error::KweryError;
pub use crate::global::{mutate, query};
pub use crate::kwery::{Kwery, STATUSES, Status};
pub use crate::operation::{Invocation, Operation};
