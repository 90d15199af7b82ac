use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::errors::RoofdeskError;
use super::{ObjectStore, StoredObject};

/// Object store backed by a directory tree.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, RoofdeskError> {
        let relative = Path::new(key);
        let clean = !key.is_empty()
            && relative.components().all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(RoofdeskError::Storage(format!("Invalid object key '{key}'")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<StoredObject, RoofdeskError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RoofdeskError::Storage(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| RoofdeskError::Storage(format!("Failed to write {key}: {e}")))?;
        debug!(key, size = bytes.len(), "Object stored");
        Ok(StoredObject {
            key: key.to_string(),
            size: bytes.len() as u64,
            content_type: content_type.to_string(),
        })
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RoofdeskError> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RoofdeskError::Storage(format!("Failed to read {key}: {e}"))),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, RoofdeskError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(RoofdeskError::Storage(format!("Failed to delete {key}: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_get_delete() {
        let dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path());

        let stored = store.put("branches/b/photo.png", b"\x89PNG", "image/png").await.unwrap();
        assert_eq!(stored.size, 4);
        assert_eq!(store.get("branches/b/photo.png").await.unwrap().unwrap(), b"\x89PNG");

        assert!(store.delete("branches/b/photo.png").await.unwrap());
        assert!(store.get("branches/b/photo.png").await.unwrap().is_none());
        assert!(!store.delete("branches/b/photo.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path());
        assert!(store.put("../outside.png", b"x", "image/png").await.is_err());
        assert!(store.put("/etc/passwd", b"x", "image/png").await.is_err());
        assert!(store.get("").await.is_err());
    }
}
