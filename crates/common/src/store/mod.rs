//! Generic keyed entity storage
//!
//! One `EntityStore<T>` holds the canonical in-memory collection for an
//! entity type and mirrors every mutation to its persistence backend.
//! The store is shared by users, papers, and reviews; entities expose
//! their key through the `Identified` capability instead of a kind
//! dispatch.

mod backend;

pub use backend::{JsonFileBackend, MemoryBackend, PersistenceBackend};

use crate::metrics;

/// Capability of exposing a stable domain identifier
pub trait Identified {
    fn id(&self) -> &str;
}

/// Generic keyed collection with write-through persistence
///
/// `restore()` runs once at construction; every mutating call triggers
/// an implicit persist. A failed persist is logged and counted but does
/// not fail the logical operation: the in-memory mutation stands. This
/// asymmetry is inherited from the original design and is part of the
/// store's contract.
pub struct EntityStore<T> {
    items: Vec<T>,
    backend: Box<dyn PersistenceBackend<T>>,
    /// Label used in logs and metrics, e.g. "users"
    kind: &'static str,
}

impl<T> EntityStore<T>
where
    T: Identified + Clone + PartialEq,
{
    /// Open a store, restoring the collection from the backend
    ///
    /// A restore failure (e.g. a corrupt collection file) starts the
    /// store empty rather than refusing to boot.
    pub fn open(kind: &'static str, backend: Box<dyn PersistenceBackend<T>>) -> Self {
        let items = match backend.restore() {
            Ok(items) => items,
            Err(e) => {
                tracing::error!(store = kind, error = %e, "Failed to restore collection, starting empty");
                Vec::new()
            }
        };

        tracing::debug!(store = kind, count = items.len(), "Collection restored");
        Self {
            items,
            backend,
            kind,
        }
    }

    /// In-memory store, useful for tests
    pub fn in_memory(kind: &'static str) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self::open(kind, Box::new(MemoryBackend::new()))
    }

    /// Add an entity if no value-equal entity is already present
    ///
    /// The duplicate check is value-based, not identity-based: two
    /// semantically distinct entities whose fields happen to coincide
    /// collide here. Inherited semantics, kept on purpose.
    pub fn save(&mut self, entity: T) -> bool {
        if self.items.contains(&entity) {
            return false;
        }
        self.items.push(entity);
        self.persist();
        true
    }

    /// Look up an entity by its identifier
    pub fn find_by_id(&self, id: &str) -> Option<T> {
        self.items.iter().find(|item| item.id() == id).cloned()
    }

    /// Independent copy of the whole collection
    pub fn find_all(&self) -> Vec<T> {
        self.items.clone()
    }

    /// Replace the stored entity carrying the same identifier
    ///
    /// Returns false when no entity with that identifier exists.
    pub fn update(&mut self, entity: T) -> bool {
        let id = entity.id().to_string();
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(slot) => {
                *slot = entity;
                self.persist();
                true
            }
            None => false,
        }
    }

    /// Remove the entity with the given identifier
    pub fn delete_by_id(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        if self.items.len() == before {
            return false;
        }
        self.persist();
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Mirror the collection to the backend; failures are reported, not
    /// propagated
    fn persist(&self) {
        if let Err(e) = self.backend.persist(&self.items) {
            metrics::record_persist_failure(self.kind);
            tracing::error!(store = self.kind, error = %e, "Failed to persist collection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        id: String,
        label: String,
    }

    impl Identified for Widget {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn widget(id: &str, label: &str) -> Widget {
        Widget {
            id: id.into(),
            label: label.into(),
        }
    }

    #[test]
    fn test_save_and_find() {
        let mut store = EntityStore::in_memory("widgets");
        assert!(store.save(widget("w1", "first")));
        assert_eq!(store.len(), 1);

        let found = store.find_by_id("w1").unwrap();
        assert_eq!(found.label, "first");
        assert!(store.find_by_id("w2").is_none());
    }

    #[test]
    fn test_save_rejects_value_equal_entity() {
        let mut store = EntityStore::in_memory("widgets");
        assert!(store.save(widget("w1", "first")));
        assert!(!store.save(widget("w1", "first")));
        assert_eq!(store.len(), 1);

        // same id with different fields is not value-equal; save admits it
        assert!(store.save(widget("w1", "changed")));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_update_replaces_wholesale() {
        let mut store = EntityStore::in_memory("widgets");
        store.save(widget("w1", "first"));

        assert!(store.update(widget("w1", "renamed")));
        assert_eq!(store.find_by_id("w1").unwrap().label, "renamed");
        assert_eq!(store.len(), 1);

        assert!(!store.update(widget("missing", "x")));
    }

    #[test]
    fn test_delete_by_id() {
        let mut store = EntityStore::in_memory("widgets");
        store.save(widget("w1", "first"));
        store.save(widget("w2", "second"));

        assert!(store.delete_by_id("w1"));
        assert_eq!(store.len(), 1);
        assert!(!store.delete_by_id("w1"));
    }

    #[test]
    fn test_find_all_returns_independent_copy() {
        let mut store = EntityStore::in_memory("widgets");
        store.save(widget("w1", "first"));

        let mut all = store.find_all();
        all.push(widget("w2", "injected"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widgets.json");

        {
            let mut store: EntityStore<Widget> =
                EntityStore::open("widgets", Box::new(JsonFileBackend::new(&path)));
            store.save(widget("w1", "first"));
            store.save(widget("w2", "second"));
            store.delete_by_id("w1");
        }

        let store: EntityStore<Widget> =
            EntityStore::open("widgets", Box::new(JsonFileBackend::new(&path)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.find_by_id("w2").unwrap().label, "second");
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widgets.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store: EntityStore<Widget> =
            EntityStore::open("widgets", Box::new(JsonFileBackend::new(&path)));
        assert!(store.is_empty());
    }
}
