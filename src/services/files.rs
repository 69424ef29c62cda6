//! File hosting service
//!
//! Upload, listing and deletion of hosted files under
//! `uploads/{userId}/{fileName}`, keeping each account's file count in step
//! with what is actually stored.

use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, warn};
use crate::models::{QuotaStats, StoredObject};
use crate::services::quota::QuotaService;
use crate::storage::ObjectStorage;
use crate::utils::errors::{PageDropError, Result, StorageError};
use crate::utils::helpers::{content_type_for, object_path, user_prefix, validate_file_name, UPLOADS_PREFIX};
use crate::utils::logging::log_user_action;

/// A hosted file with its public link
#[derive(Debug, Clone, PartialEq)]
pub struct HostedFile {
    pub path: String,
    pub name: String,
    pub url: String,
    pub size: u64,
}

/// Result of a successful upload
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub file_name: String,
    pub url: String,
    /// An existing file of the same name was replaced
    pub replaced: bool,
    pub stats: QuotaStats,
}

/// Outcome of removing all files of one user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub deleted: usize,
    /// Names of files that are still stored
    pub failed: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FileService {
    storage: Arc<dyn ObjectStorage>,
    quota: QuotaService,
}

impl FileService {
    pub fn new(storage: Arc<dyn ObjectStorage>, quota: QuotaService) -> Self {
        Self { storage, quota }
    }

    fn hosted(&self, object: StoredObject) -> HostedFile {
        HostedFile {
            url: self.storage.public_url(&object),
            name: object.file_name().to_string(),
            size: object.size,
            path: object.path,
        }
    }

    /// Host a new file for `user_id`
    ///
    /// A slot is reserved before `fetch` runs; if fetching or storing fails
    /// the slot is given back. Replacing a file of the same name does not
    /// take a new slot. The account must already exist.
    pub async fn upload<F>(&self, user_id: i64, file_name: &str, reported_mime: Option<&str>, fetch: F) -> Result<UploadReceipt>
    where
        F: Future<Output = Result<Vec<u8>>> + Send,
    {
        let name = validate_file_name(file_name)?;
        let path = object_path(user_id, &name);
        let content_type = content_type_for(&name, reported_mime);

        let replaced = self.storage.exists(&path).await?;
        let reserved = if replaced {
            self.quota.get_stats(user_id).await?
        } else {
            self.quota.reserve_slot(user_id).await?
        };

        let stored = async {
            let bytes = fetch.await?;
            Ok::<_, PageDropError>(self.storage.put_object(&path, bytes, &content_type).await?)
        }
        .await;

        match stored {
            Ok(object) => {
                log_user_action(user_id, "upload", Some(&name));
                info!(user_id = user_id, file_name = %name, replaced = replaced, "File hosted");
                Ok(UploadReceipt {
                    url: self.storage.public_url(&object),
                    file_name: name,
                    replaced,
                    stats: reserved,
                })
            }
            Err(e) => {
                if !replaced {
                    if let Err(release_error) = self.quota.release_slot(user_id).await {
                        error!(user_id = user_id, error = %release_error, "Failed to release slot after failed upload");
                    }
                }
                warn!(user_id = user_id, file_name = %name, error = %e, "Upload failed");
                Err(e)
            }
        }
    }

    /// Files hosted by one user
    pub async fn list_user_files(&self, user_id: i64) -> Result<Vec<HostedFile>> {
        let objects = self.storage.list_objects(&user_prefix(user_id)).await?;
        Ok(objects.into_iter().map(|o| self.hosted(o)).collect())
    }

    /// Every hosted file
    pub async fn list_all_files(&self) -> Result<Vec<HostedFile>> {
        let objects = self.storage.list_objects(UPLOADS_PREFIX).await?;
        Ok(objects.into_iter().map(|o| self.hosted(o)).collect())
    }

    /// Delete one of the user's files and free its slot
    pub async fn delete(&self, user_id: i64, file_name: &str) -> Result<QuotaStats> {
        let name = file_name.trim();
        if name.is_empty() {
            return Err(PageDropError::InvalidInput("Please send the name of the file to delete.".to_string()));
        }
        let path = object_path(user_id, name);

        if !self.storage.exists(&path).await? {
            return Err(PageDropError::FileNotFound { file_name: name.to_string() });
        }

        match self.storage.delete_object(&path).await {
            Ok(()) => {}
            Err(StorageError::NotFound(_)) => {
                return Err(PageDropError::FileNotFound { file_name: name.to_string() });
            }
            Err(e) => return Err(e.into()),
        }

        log_user_action(user_id, "delete", Some(name));
        self.release_after_delete(user_id).await
    }

    /// Remove every file of a user and reset their file count
    ///
    /// A failed delete does not stop the scan. Afterwards the count is set to
    /// the number of files that could not be deleted, in one atomic update.
    pub async fn delete_user_files(&self, user_id: i64) -> Result<PurgeReport> {
        let objects = self.storage.list_objects(&user_prefix(user_id)).await?;
        let mut report = PurgeReport::default();

        for object in objects {
            match self.storage.delete_object(&object.path).await {
                Ok(()) | Err(StorageError::NotFound(_)) => report.deleted += 1,
                Err(e) => {
                    warn!(user_id = user_id, path = %object.path, error = %e, "Failed to delete file");
                    report.failed.push(object.file_name().to_string());
                }
            }
        }

        let remaining = u32::try_from(report.failed.len()).unwrap_or(u32::MAX);
        match self.quota.set_file_count(user_id, remaining).await {
            Ok(_) => {}
            Err(PageDropError::UserNotFound { .. }) => {
                warn!(user_id = user_id, "Deleted files of a user without an account");
            }
            Err(e) => return Err(e),
        }

        info!(user_id = user_id, deleted = report.deleted, failed = report.failed.len(), "User files removed");
        Ok(report)
    }

    async fn release_after_delete(&self, user_id: i64) -> Result<QuotaStats> {
        match self.quota.release_slot(user_id).await {
            Err(PageDropError::UserNotFound { .. }) => {
                warn!(user_id = user_id, "Deleted a file of a user without an account");
                self.quota.get_stats(user_id).await
            }
            other => other,
        }
    }
}
