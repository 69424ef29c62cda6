//! In-memory object storage

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use async_trait::async_trait;
use chrono::Utc;
use crate::models::StoredObject;
use crate::storage::ObjectStorage;
use crate::utils::errors::{StorageError, StorageResult};

#[derive(Debug, Clone)]
pub struct MemoryStorage {
    base_url: String,
    objects: Arc<Mutex<BTreeMap<String, (StoredObject, Vec<u8>)>>>,
}

impl MemoryStorage {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            objects: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    fn objects(&self) -> MutexGuard<'_, BTreeMap<String, (StoredObject, Vec<u8>)>> {
        self.objects.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Stored bytes, if the object exists
    pub fn read(&self, path: &str) -> Option<Vec<u8>> {
        self.objects().get(path).map(|(_, bytes)| bytes.clone())
    }

    pub fn len(&self) -> usize {
        self.objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn put_object(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StorageResult<StoredObject> {
        let object = StoredObject {
            path: path.to_string(),
            size: bytes.len() as u64,
            content_type: Some(content_type.to_string()),
            download_token: None,
            updated_at: Some(Utc::now()),
        };
        self.objects().insert(path.to_string(), (object.clone(), bytes));
        Ok(object)
    }

    async fn list_objects(&self, prefix: &str) -> StorageResult<Vec<StoredObject>> {
        Ok(self
            .objects()
            .range(prefix.to_string()..)
            .take_while(|(path, _)| path.starts_with(prefix))
            .map(|(_, (object, _))| object.clone())
            .collect())
    }

    async fn delete_object(&self, path: &str) -> StorageResult<()> {
        match self.objects().remove(path) {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound(path.to_string())),
        }
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.objects().contains_key(path))
    }

    fn public_url(&self, object: &StoredObject) -> String {
        format!("{}/{}", self.base_url, object.path)
    }
}
