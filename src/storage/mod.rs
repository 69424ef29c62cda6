//! Object storage module
//!
//! Hosted files live in an object store under `uploads/{userId}/{fileName}`.
//! The [`ObjectStorage`] trait is the seam; Firebase (GCS JSON API) and an
//! in-memory map implement it.

pub mod firebase;
pub mod memory;

use std::sync::Arc;
use async_trait::async_trait;
use crate::config::{StorageBackend, StorageConfig};
use crate::models::StoredObject;
use crate::utils::errors::{Result, StorageResult};

pub use firebase::{FirebaseStorage, ServiceAccountKey};
pub use memory::MemoryStorage;

#[async_trait]
pub trait ObjectStorage: Send + Sync + std::fmt::Debug {
    /// Provider name, e.g. "firebase"
    fn provider_type(&self) -> &str;

    /// Store (or overwrite) an object and make it publicly readable
    async fn put_object(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StorageResult<StoredObject>;

    /// All objects whose path starts with `prefix`
    async fn list_objects(&self, prefix: &str) -> StorageResult<Vec<StoredObject>>;

    /// Remove an object; `NotFound` if it does not exist
    async fn delete_object(&self, path: &str) -> StorageResult<()>;

    async fn exists(&self, path: &str) -> StorageResult<bool>;

    /// Public download link for an object
    fn public_url(&self, object: &StoredObject) -> String;
}

/// Build the configured storage backend
pub fn connect(config: &StorageConfig) -> Result<Arc<dyn ObjectStorage>> {
    match config.backend {
        StorageBackend::Firebase => Ok(Arc::new(FirebaseStorage::from_config(config)?)),
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory object storage; hosted files will not survive a restart");
            Ok(Arc::new(MemoryStorage::new("http://localhost/files")))
        }
    }
}
