use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::kwery::Kwery;
use crate::signature::Signature;

/// Per-client mapping from query signature to its entry.
///
/// Entries are never evicted; they live as long as the owning client.
#[derive(Debug, Clone, Default)]
pub(crate) struct CacheStore {
    entries: Arc<DashMap<Signature, Kwery>>,
}

impl CacheStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Gets the entry for `signature`, if one was created.
    pub(crate) fn get(&self, signature: &Signature) -> Option<Kwery> {
        self.entries.get(signature).map(|entry| entry.value().clone())
    }

    /// Returns the entry for `signature`, creating it with `make` if absent.
    ///
    /// The flag is `true` when this call created the entry. `make` runs under
    /// the shard lock and must not call back into the store.
    pub(crate) fn get_or_insert_with(
        &self,
        signature: Signature,
        make: impl FnOnce(&Signature) -> Kwery,
    ) -> (Kwery, bool) {
        match self.entries.entry(signature) {
            Entry::Occupied(occupied) => (occupied.get().clone(), false),
            Entry::Vacant(vacant) => {
                let kwery = make(vacant.key());
                vacant.insert(kwery.clone());
                (kwery, true)
            }
        }
    }

    pub(crate) fn contains(&self, signature: &Signature) -> bool {
        self.entries.contains_key(signature)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
