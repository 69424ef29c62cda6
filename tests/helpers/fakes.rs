//! Fake collaborators
//!
//! `FakeSender` records outbound messages and fails for chosen chats.
//! `FlakyUserStore`, `FailingStorage` and `StickyStorage` wrap the in-memory
//! backends and inject failures.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use PageDrop::database::{MemoryUserStore, StatsMutation, UserStore};
use PageDrop::models::{BroadcastPayload, QuotaStats, StoredObject, UserAccount};
use PageDrop::storage::{MemoryStorage, ObjectStorage};
use PageDrop::utils::errors::{PageDropError, Result, StorageError, StorageResult};

/// A message captured by [`FakeSender`]
#[derive(Debug, Clone, PartialEq)]
pub enum SentMessage {
    Text { chat_id: i64, text: String },
    Payload { chat_id: i64, payload: BroadcastPayload },
}

impl SentMessage {
    pub fn chat_id(&self) -> i64 {
        match self {
            SentMessage::Text { chat_id, .. } | SentMessage::Payload { chat_id, .. } => *chat_id,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeSender {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    failing: Arc<Mutex<HashSet<i64>>>,
}

impl FakeSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delivery to these chats fails, as if they blocked the bot
    pub fn fail_for(&self, chat_ids: impl IntoIterator<Item = i64>) {
        self.failing.lock().unwrap().extend(chat_ids);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts_to(&self, chat_id: i64) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|m| match m {
                SentMessage::Text { chat_id: id, text } if id == chat_id => Some(text),
                _ => None,
            })
            .collect()
    }

    fn check(&self, chat_id: i64) -> Result<()> {
        if self.failing.lock().unwrap().contains(&chat_id) {
            return Err(PageDropError::InvalidInput(format!("Forbidden: bot was blocked by {}", chat_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl PageDrop::services::MessageSender for FakeSender {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.check(chat_id)?;
        self.sent.lock().unwrap().push(SentMessage::Text {
            chat_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_payload(&self, chat_id: i64, payload: &BroadcastPayload) -> Result<()> {
        self.check(chat_id)?;
        self.sent.lock().unwrap().push(SentMessage::Payload {
            chat_id,
            payload: payload.clone(),
        });
        Ok(())
    }
}

/// In-memory user store whose operations fail for chosen accounts
#[derive(Debug, Clone, Default)]
pub struct FlakyUserStore {
    inner: MemoryUserStore,
    failing: Arc<Mutex<HashSet<i64>>>,
    failing_lookups: Arc<Mutex<HashSet<i64>>>,
}

impl FlakyUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_updates_for(&self, chat_id: i64) {
        self.failing.lock().unwrap().insert(chat_id);
    }

    /// Reads and creates of this account fail
    pub fn fail_lookups_for(&self, chat_id: i64) {
        self.failing_lookups.lock().unwrap().insert(chat_id);
    }

    fn check_lookup(&self, chat_id: i64) -> Result<()> {
        if self.failing_lookups.lock().unwrap().contains(&chat_id) {
            return Err(PageDropError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "store connection lost",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for FlakyUserStore {
    async fn get_user(&self, chat_id: i64) -> Result<Option<UserAccount>> {
        self.check_lookup(chat_id)?;
        self.inner.get_user(chat_id).await
    }

    async fn create_if_absent(&self, account: UserAccount) -> Result<bool> {
        self.check_lookup(account.chat_id)?;
        self.inner.create_if_absent(account).await
    }

    async fn list_users(&self) -> Result<Vec<UserAccount>> {
        self.inner.list_users().await
    }

    async fn count_users(&self) -> Result<u64> {
        self.inner.count_users().await
    }

    async fn update_stats(&self, chat_id: i64, mutation: StatsMutation) -> Result<QuotaStats> {
        if self.failing.lock().unwrap().contains(&chat_id) {
            return Err(PageDropError::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "store timed out",
            )));
        }
        self.inner.update_stats(chat_id, mutation).await
    }
}

/// Object storage whose writes always fail
#[derive(Debug, Clone)]
pub struct FailingStorage {
    inner: MemoryStorage,
}

impl FailingStorage {
    pub fn new() -> Self {
        Self {
            inner: MemoryStorage::new("http://files.test"),
        }
    }
}

#[async_trait]
impl ObjectStorage for FailingStorage {
    fn provider_type(&self) -> &str {
        "failing"
    }

    async fn put_object(&self, _path: &str, _bytes: Vec<u8>, _content_type: &str) -> StorageResult<StoredObject> {
        Err(StorageError::RequestFailed("HTTP 503: backend unavailable".to_string()))
    }

    async fn list_objects(&self, prefix: &str) -> StorageResult<Vec<StoredObject>> {
        self.inner.list_objects(prefix).await
    }

    async fn delete_object(&self, path: &str) -> StorageResult<()> {
        self.inner.delete_object(path).await
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        self.inner.exists(path).await
    }

    fn public_url(&self, object: &StoredObject) -> String {
        self.inner.public_url(object)
    }
}

/// Storage whose deletes fail for chosen paths; everything else is memory
#[derive(Debug, Clone)]
pub struct StickyStorage {
    inner: MemoryStorage,
    stuck: Arc<Mutex<HashSet<String>>>,
}

impl StickyStorage {
    pub fn new() -> Self {
        Self {
            inner: MemoryStorage::new("http://files.test"),
            stuck: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Every delete of `path` fails from now on
    pub fn stick(&self, path: &str) {
        self.stuck.lock().unwrap().insert(path.to_string());
    }
}

#[async_trait]
impl ObjectStorage for StickyStorage {
    fn provider_type(&self) -> &str {
        "sticky"
    }

    async fn put_object(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StorageResult<StoredObject> {
        self.inner.put_object(path, bytes, content_type).await
    }

    async fn list_objects(&self, prefix: &str) -> StorageResult<Vec<StoredObject>> {
        self.inner.list_objects(prefix).await
    }

    async fn delete_object(&self, path: &str) -> StorageResult<()> {
        if self.stuck.lock().unwrap().contains(path) {
            return Err(StorageError::RequestFailed("HTTP 500: delete rejected".to_string()));
        }
        self.inner.delete_object(path).await
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        self.inner.exists(path).await
    }

    fn public_url(&self, object: &StoredObject) -> String {
        self.inner.public_url(object)
    }
}
