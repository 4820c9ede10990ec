use std::sync::Arc;

use serde::Serialize;

use crate::cache::CacheStore;
use crate::config::KweryConfig;
use crate::dispatch::{Executor, Kweries, Mutations};
use crate::signature::{Args, Signature};

/// An isolated cache plus the dispatchers for one configuration.
///
/// Cloning a `Client` yields another handle to the same cache. Clients created
/// separately never share entries.
///
/// # Example
///
/// ```
/// use kwery::{KweryConfig, Status, create_kwery};
/// use serde_json::json;
///
/// let client = create_kwery(
///     KweryConfig::new()
///         .query_sync("cachedRequest", |_| Ok(json!("cached request message")))
///         .mutation_sync("createRequest", |args| Ok(args.get(0).cloned().unwrap_or_default())),
/// );
///
/// let first = client.query(|kweries| kweries.get("cachedRequest")).unwrap();
/// let second = client.query(|kweries| kweries.get("cachedRequest")).unwrap();
/// assert_eq!(first, second);
///
/// let created = client.mutate(|mutations| mutations.call("createRequest", "hello")).unwrap();
/// assert_eq!(created.status(), Status::Success);
/// assert_eq!(created.data(), Some(json!("hello")));
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    kweries: Kweries,
    mutations: Mutations,
}

/// Creates a [`Client`] for `config`.
#[must_use]
pub fn create_kwery(config: KweryConfig) -> Client {
    Client::new(config)
}

impl Client {
    /// Creates a client with a fresh, empty cache.
    #[must_use]
    pub fn new(config: KweryConfig) -> Self {
        let KweryConfig {
            queries,
            mutations,
            runtime,
        } = config;
        let executor = Executor::new(runtime);

        Self {
            inner: Arc::new(Inner {
                kweries: Kweries::new(queries, CacheStore::new(), executor.clone()),
                mutations: Mutations::new(mutations, executor),
            }),
        }
    }

    /// Runs `selector` against this client's queries and returns its result verbatim.
    pub fn query<T>(&self, selector: impl FnOnce(&Kweries) -> T) -> T {
        selector(&self.inner.kweries)
    }

    /// Runs `selector` against this client's mutations and returns its result verbatim.
    pub fn mutate<T>(&self, selector: impl FnOnce(&Mutations) -> T) -> T {
        selector(&self.inner.mutations)
    }

    /// Returns the number of cached query entries.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.inner.kweries.cache().len()
    }

    /// Returns `true` if calling `name` with `args` would hit the cache.
    ///
    /// Arguments that cannot form a cache key are never cached.
    #[must_use]
    pub fn is_cached(&self, name: &str, args: impl Serialize) -> bool {
        Args::new(args)
            .ok()
            .and_then(|args| Signature::derive(name, &args).ok())
            .is_some_and(|signature| self.inner.kweries.cache().contains(&signature))
    }

    /// Iterates over the configured query names in sorted order.
    pub fn query_names(&self) -> impl Iterator<Item = &str> {
        self.inner.kweries.names()
    }

    /// Iterates over the configured mutation names in sorted order.
    pub fn mutation_names(&self) -> impl Iterator<Item = &str> {
        self.inner.mutations.names()
    }

    /// Returns `true` if both handles refer to the same client.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(KweryConfig::default())
    }
}
