use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use dashmap::DashMap;

/// Entry shape held by the store. Entries are untyped so that readers
/// can detect a collaborator writing the wrong object shape instead of
/// silently misreading it.
pub type CacheEntry = Arc<dyn Any + Send + Sync>;

/// Local read-through cache maintained by a watch source, keyed by
/// `namespace/name`. The watch loop is the only writer; lookups are
/// lock-free point reads.
#[derive(Default)]
pub struct ObjectStore {
    items: DashMap<String, CacheEntry>,
}

impl Debug for ObjectStore {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ObjectStore").field("len", &self.items.len()).finish()
    }
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        key: impl Into<String>,
        entry: CacheEntry,
    ) {
        self.items.insert(key.into(), entry);
    }

    pub fn remove(
        &self,
        key: &str,
    ) -> Option<CacheEntry> {
        self.items.remove(key).map(|(_, entry)| entry)
    }

    pub fn get_by_key(
        &self,
        key: &str,
    ) -> Option<CacheEntry> {
        self.items.get(key).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
