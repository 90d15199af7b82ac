pub mod local;
pub mod keys;

pub use keys::{issue_image_key, snapshot_key, ImageKind};
pub use local::LocalObjectStore;

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::RoofdeskError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub content_type: String,
}

/// Blob storage for photos and map snapshots.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<StoredObject, RoofdeskError>;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RoofdeskError>;

    /// Returns whether the object existed.
    async fn delete(&self, key: &str) -> Result<bool, RoofdeskError>;
}
