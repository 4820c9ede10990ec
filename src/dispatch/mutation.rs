use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::error::KweryError;
use crate::kwery::{Kwery, Source};
use crate::operation::Operation;
use crate::signature::Args;

use super::Executor;

/// The mutation capability set handed to mutation selectors.
///
/// Unlike [`Kweries`](super::Kweries), nothing here is cached: every call
/// creates a new [`Kwery`] and invokes the mutation.
#[derive(Debug, Clone)]
pub struct Mutations {
    operations: Arc<BTreeMap<String, Operation>>,
    executor: Executor,
}

impl Mutations {
    pub(crate) fn new(operations: BTreeMap<String, Operation>, executor: Executor) -> Self {
        Self {
            operations: Arc::new(operations),
            executor,
        }
    }

    /// Returns the capability for the mutation called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`KweryError::UnknownMutation`] if no such mutation was configured.
    pub fn capability<'a>(&'a self, name: &'a str) -> Result<MutationCapability<'a>, KweryError> {
        let operation = self
            .operations
            .get(name)
            .ok_or_else(|| KweryError::UnknownMutation(name.to_string()))?;

        Ok(MutationCapability {
            name,
            operation,
            executor: &self.executor,
        })
    }

    /// Runs `name` with no arguments.
    ///
    /// # Errors
    ///
    /// Returns [`KweryError::UnknownMutation`] if no such mutation was configured.
    pub fn get(&self, name: &str) -> Result<Kwery, KweryError> {
        self.capability(name)?.get()
    }

    /// Runs `name` with `args`.
    ///
    /// # Errors
    ///
    /// Returns [`KweryError::UnknownMutation`] if no such mutation was configured,
    /// or [`KweryError::InvalidArguments`] if `args` cannot be serialized.
    pub fn call(&self, name: &str, args: impl Serialize) -> Result<Kwery, KweryError> {
        self.capability(name)?.call(args)
    }

    /// Returns `true` if a mutation called `name` was configured.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Iterates over the configured mutation names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }
}

/// One named mutation.
#[derive(Debug, Clone, Copy)]
pub struct MutationCapability<'a> {
    name: &'a str,
    operation: &'a Operation,
    executor: &'a Executor,
}

impl MutationCapability<'_> {
    /// Returns the mutation name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name
    }

    /// Runs the mutation with no arguments.
    ///
    /// # Errors
    ///
    /// Never fails; returns a `Result` to mirror [`Capability::get`](super::Capability::get).
    #[allow(clippy::unnecessary_wraps)]
    pub fn get(&self) -> Result<Kwery, KweryError> {
        Ok(self.run(Args::empty()))
    }

    /// Runs the mutation with `args`, returning a new entry.
    ///
    /// # Errors
    ///
    /// Returns [`KweryError::InvalidArguments`] if `args` cannot be serialized.
    pub fn call(&self, args: impl Serialize) -> Result<Kwery, KweryError> {
        let args = Args::new(args).map_err(|e| KweryError::InvalidArguments {
            name: self.name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.run(args))
    }

    fn run(&self, args: Args) -> Kwery {
        let kwery = Kwery::pending(Source::Mutation {
            name: self.name.to_string(),
        });
        self.executor.execute(&kwery, self.operation, args);
        kwery
    }
}
