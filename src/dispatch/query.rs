use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::cache::CacheStore;
use crate::error::KweryError;
use crate::kwery::{Kwery, Source};
use crate::operation::Operation;
use crate::signature::{Args, Signature};

use super::Executor;

/// The query capability set handed to query selectors.
///
/// Built once per client. Every lookup goes through the client's cache, so the
/// same `(name, args)` always yields the same [`Kwery`].
///
/// # Example
///
/// ```
/// use kwery::{KweryConfig, create_kwery};
/// use serde_json::json;
///
/// let client = create_kwery(
///     KweryConfig::new()
///         .query_sync("requests", |_| Ok(json!("hello all")))
///         .query_sync("request", |args| {
///             let id: String = args.parse(0).map_err(|e| json!(e.to_string()))?;
///             Ok(json!(format!("hello {id}")))
///         }),
/// );
///
/// client.query(|kweries| {
///     let all = kweries.get("requests").unwrap();
///     let one = kweries.call("request", "person").unwrap();
///
///     assert_eq!(all.data(), Some(json!("hello all")));
///     assert_eq!(one.data(), Some(json!("hello person")));
/// });
/// ```
#[derive(Debug, Clone)]
pub struct Kweries {
    operations: Arc<BTreeMap<String, Operation>>,
    cache: CacheStore,
    executor: Executor,
}

impl Kweries {
    pub(crate) fn new(
        operations: BTreeMap<String, Operation>,
        cache: CacheStore,
        executor: Executor,
    ) -> Self {
        Self {
            operations: Arc::new(operations),
            cache,
            executor,
        }
    }

    /// Returns the capability for the query called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`KweryError::UnknownQuery`] if no such query was configured.
    pub fn capability<'a>(&'a self, name: &'a str) -> Result<Capability<'a>, KweryError> {
        let operation = self
            .operations
            .get(name)
            .ok_or_else(|| KweryError::UnknownQuery(name.to_string()))?;

        Ok(Capability {
            name,
            operation,
            kweries: self,
        })
    }

    /// Returns the entry for calling `name` with no arguments.
    ///
    /// # Errors
    ///
    /// Returns [`KweryError::UnknownQuery`] if no such query was configured.
    pub fn get(&self, name: &str) -> Result<Kwery, KweryError> {
        self.capability(name)?.get()
    }

    /// Returns the entry for calling `name` with `args`.
    ///
    /// # Errors
    ///
    /// Returns [`KweryError::UnknownQuery`] if no such query was configured, or
    /// [`KweryError::KeyDerivation`] if `args` cannot be turned into a cache key.
    pub fn call(&self, name: &str, args: impl Serialize) -> Result<Kwery, KweryError> {
        self.capability(name)?.call(args)
    }

    /// Returns `true` if a query called `name` was configured.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Iterates over the configured query names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub(crate) fn cache(&self) -> &CacheStore {
        &self.cache
    }

    fn resolve(&self, name: &str, operation: &Operation, args: Args) -> Result<Kwery, KweryError> {
        let signature = Signature::derive(name, &args)?;

        if let Some(kwery) = self.cache.get(&signature) {
            debug!(signature = %signature, "Query cache hit");
            return Ok(kwery);
        }

        let (kwery, created) = self.cache.get_or_insert_with(signature, |signature| {
            Kwery::pending(Source::Query {
                signature: signature.clone(),
                args: args.clone(),
                operation: operation.clone(),
                executor: self.executor.clone(),
            })
        });

        if created {
            debug!(name = %name, "Query cache miss");
            self.executor.execute(&kwery, operation, args);
        }

        Ok(kwery)
    }
}

/// One named query: readable as its zero-argument entry, callable with arguments.
#[derive(Debug, Clone, Copy)]
pub struct Capability<'a> {
    name: &'a str,
    operation: &'a Operation,
    kweries: &'a Kweries,
}

impl Capability<'_> {
    /// Returns the query name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name
    }

    /// Returns the entry for the zero-argument call.
    ///
    /// # Errors
    ///
    /// Returns [`KweryError::KeyDerivation`] if the cache key cannot be derived.
    pub fn get(&self) -> Result<Kwery, KweryError> {
        self.kweries.resolve(self.name, self.operation, Args::empty())
    }

    /// Returns the entry for calling the query with `args`, invoking it if this
    /// signature has not been seen before.
    ///
    /// # Errors
    ///
    /// Returns [`KweryError::KeyDerivation`] if `args` cannot be turned into a cache key.
    pub fn call(&self, args: impl Serialize) -> Result<Kwery, KweryError> {
        let args = Args::new(args).map_err(|e| KweryError::KeyDerivation {
            name: self.name.to_string(),
            reason: e.to_string(),
        })?;
        self.kweries.resolve(self.name, self.operation, args)
    }
}
