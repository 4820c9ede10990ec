use std::collections::BTreeMap;

use tokio::runtime::Handle;

use crate::operation::{Operation, Outcome};
use crate::signature::Args;

/// Configuration for a [`Client`](crate::Client).
///
/// Holds the named query and mutation operations and, optionally, the tokio
/// runtime used to drive asynchronous operations. Without a runtime handle,
/// asynchronous operations run on whatever runtime the call is made from.
///
/// Registering a name twice replaces the earlier operation.
///
/// # Example
///
/// ```
/// use kwery::KweryConfig;
/// use serde_json::json;
///
/// let config = KweryConfig::new()
///     .query_sync("requests", |_| Ok(json!("hello all")))
///     .query_async("user", |args| async move {
///         let id: u64 = args.parse(0).map_err(|e| json!(e.to_string()))?;
///         Ok::<_, serde_json::Value>(json!({ "id": id }))
///     })
///     .mutation_sync("createRequest", |args| Ok(args.get(0).cloned().unwrap_or_default()));
///
/// assert_eq!(config.query_names().collect::<Vec<_>>(), vec!["requests", "user"]);
/// assert_eq!(config.mutation_names().collect::<Vec<_>>(), vec!["createRequest"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct KweryConfig {
    pub(crate) queries: BTreeMap<String, Operation>,
    pub(crate) mutations: BTreeMap<String, Operation>,
    pub(crate) runtime: Option<Handle>,
}

impl KweryConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a query.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, operation: Operation) -> Self {
        self.queries.insert(name.into(), operation);
        self
    }

    /// Registers a synchronous query.
    #[must_use]
    pub fn query_sync<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Args) -> Outcome + Send + Sync + 'static,
    {
        self.query(name, Operation::sync(f))
    }

    /// Registers an asynchronous query.
    #[must_use]
    pub fn query_async<F, Fut>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        self.query(name, Operation::future(f))
    }

    /// Registers a mutation.
    #[must_use]
    pub fn mutation(mut self, name: impl Into<String>, operation: Operation) -> Self {
        self.mutations.insert(name.into(), operation);
        self
    }

    /// Registers a synchronous mutation.
    #[must_use]
    pub fn mutation_sync<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Args) -> Outcome + Send + Sync + 'static,
    {
        self.mutation(name, Operation::sync(f))
    }

    /// Registers an asynchronous mutation.
    #[must_use]
    pub fn mutation_async<F, Fut>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        self.mutation(name, Operation::future(f))
    }

    /// Drives asynchronous operations on `runtime` instead of the caller's runtime.
    #[must_use]
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Iterates over the registered query names in sorted order.
    pub fn query_names(&self) -> impl Iterator<Item = &str> {
        self.queries.keys().map(String::as_str)
    }

    /// Iterates over the registered mutation names in sorted order.
    pub fn mutation_names(&self) -> impl Iterator<Item = &str> {
        self.mutations.keys().map(String::as_str)
    }

    /// Returns the configured runtime handle, if any.
    #[must_use]
    pub const fn runtime(&self) -> Option<&Handle> {
        self.runtime.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = KweryConfig::default();
        assert_eq!(config.query_names().count(), 0);
        assert_eq!(config.mutation_names().count(), 0);
        assert!(config.runtime().is_none());
    }

    #[test]
    fn test_register_operations() {
        let config = KweryConfig::new()
            .query_sync("b", |_| Ok(json!(1)))
            .query_async("a", |_| async { Ok(json!(2)) })
            .mutation("create", Operation::sync(|_| Ok(json!(3))))
            .mutation_async("update", |_| async { Err(json!("no")) });

        assert_eq!(config.query_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(
            config.mutation_names().collect::<Vec<_>>(),
            vec!["create", "update"]
        );
    }

    #[test]
    fn test_register_twice_replaces() {
        let config = KweryConfig::new()
            .query_sync("a", |_| Ok(json!(1)))
            .query_sync("a", |_| Ok(json!(2)));

        assert_eq!(config.query_names().count(), 1);
    }

    #[tokio::test]
    async fn test_with_runtime() {
        let config = KweryConfig::new().with_runtime(Handle::current());
        assert!(config.runtime().is_some());
    }
}
