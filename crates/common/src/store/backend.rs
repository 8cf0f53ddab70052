//! Persistence backends for the entity store
//!
//! A backend persists and restores one whole collection; there is no
//! incremental log and no transaction spanning entity types. The JSON
//! backend rewrites its file through a temp file + rename so a crashed
//! write never truncates the collection.

use crate::errors::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Durable storage for one entity collection
pub trait PersistenceBackend<T>: Send + Sync {
    /// Write the full collection, replacing whatever was stored
    fn persist(&self, items: &[T]) -> Result<()>;

    /// Read the full collection; an absent store yields an empty one
    fn restore(&self) -> Result<Vec<T>>;
}

/// File-backed JSON collection, one file per entity type
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl<T> PersistenceBackend<T> for JsonFileBackend
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn persist(&self, items: &[T]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_vec_pretty(items)?;
        let tmp = self.temp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn restore(&self) -> Result<Vec<T>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let bytes = fs::read(&self.path)?;
        serde_json::from_slice(&bytes).map_err(|e| AppError::Persistence {
            message: format!("corrupt collection file {}: {}", self.path.display(), e),
        })
    }
}

/// Volatile backend for tests and ephemeral runs
#[derive(Default)]
pub struct MemoryBackend;

impl MemoryBackend {
    pub fn new() -> Self {
        Self
    }
}

impl<T> PersistenceBackend<T> for MemoryBackend
where
    T: Send + Sync,
{
    fn persist(&self, _items: &[T]) -> Result<()> {
        Ok(())
    }

    fn restore(&self) -> Result<Vec<T>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
        value: i32,
    }

    #[test]
    fn test_json_backend_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("items.json"));

        let items = vec![
            Item {
                id: "a".into(),
                value: 1,
            },
            Item {
                id: "b".into(),
                value: 2,
            },
        ];
        backend.persist(&items).unwrap();

        let restored: Vec<Item> = backend.restore().unwrap();
        assert_eq!(restored, items);
    }

    #[test]
    fn test_missing_file_restores_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("absent.json"));
        let restored: Vec<Item> = backend.restore().unwrap();
        assert!(restored.is_empty());
    }

    #[test]
    fn test_persist_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("nested/deep/items.json"));
        backend.persist(&[] as &[Item]).unwrap();
        let restored: Vec<Item> = backend.restore().unwrap();
        assert!(restored.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        fs::write(&path, b"not json").unwrap();

        let backend = JsonFileBackend::new(&path);
        let restored: Result<Vec<Item>> = backend.restore();
        assert!(restored.is_err());
    }

    #[test]
    fn test_rewrite_replaces_collection() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("items.json"));

        backend
            .persist(&[Item {
                id: "a".into(),
                value: 1,
            }])
            .unwrap();
        backend
            .persist(&[Item {
                id: "b".into(),
                value: 2,
            }])
            .unwrap();

        let restored: Vec<Item> = backend.restore().unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].id, "b");
    }
}
