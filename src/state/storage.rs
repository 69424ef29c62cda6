//! State storage implementation
//!
//! Conversation contexts live either in process memory or in Redis (with a
//! TTL matching the context expiry). Both backends treat an expired context
//! as absent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use chrono::Duration;
use redis::AsyncCommands;
use tracing::{debug, info, warn};
use crate::config::{RedisConfig, SessionBackend, Settings};
use crate::utils::errors::{PageDropError, Result};
use super::context::{ConversationContext, PendingInput};

#[derive(Clone)]
enum Backend {
    Memory(Arc<Mutex<HashMap<i64, ConversationContext>>>),
    Redis {
        connection_manager: redis::aio::ConnectionManager,
        prefix: String,
    },
}

/// Per-issuer pending-input storage
#[derive(Clone)]
pub struct StateStorage {
    backend: Backend,
    timeout: Duration,
}

impl std::fmt::Debug for StateStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = match &self.backend {
            Backend::Memory(_) => "memory",
            Backend::Redis { .. } => "redis",
        };
        f.debug_struct("StateStorage")
            .field("backend", &backend)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl StateStorage {
    /// In-process storage
    pub fn in_memory(timeout_seconds: u64) -> Self {
        Self {
            backend: Backend::Memory(Arc::new(Mutex::new(HashMap::new()))),
            timeout: seconds(timeout_seconds),
        }
    }

    /// Redis-backed storage
    pub async fn redis(config: &RedisConfig, timeout_seconds: u64) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            backend: Backend::Redis {
                connection_manager,
                prefix: config.prefix.clone(),
            },
            timeout: seconds(timeout_seconds),
        })
    }

    /// Build the configured backend
    pub async fn connect(settings: &Settings) -> Result<Self> {
        match settings.session.backend {
            SessionBackend::Memory => Ok(Self::in_memory(settings.session.timeout_seconds)),
            SessionBackend::Redis => {
                info!("Connecting to Redis...");
                Self::redis(&settings.redis, settings.session.timeout_seconds).await
            }
        }
    }

    fn memory_map(map: &Mutex<HashMap<i64, ConversationContext>>) -> MutexGuard<'_, HashMap<i64, ConversationContext>> {
        map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn context_key(prefix: &str, user_id: i64) -> String {
        format!("{}context:{}", prefix, user_id)
    }

    /// Save conversation context
    pub async fn save_context(&self, context: &ConversationContext) -> Result<()> {
        match &self.backend {
            Backend::Memory(map) => {
                Self::memory_map(map).insert(context.user_id, context.clone());
            }
            Backend::Redis { connection_manager, prefix } => {
                let key = Self::context_key(prefix, context.user_id);
                let serialized = serde_json::to_string(context)?;
                let ttl_seconds = context.remaining_seconds().max(1);
                let mut conn = connection_manager.clone();
                conn.set_ex::<_, _, ()>(&key, serialized, ttl_seconds).await?;
            }
        }
        debug!(user_id = context.user_id, pending = %context.pending, "Context saved");
        Ok(())
    }

    /// Load conversation context; expired contexts are removed and read as idle
    pub async fn load_context(&self, user_id: i64) -> Result<Option<ConversationContext>> {
        let context = match &self.backend {
            Backend::Memory(map) => Self::memory_map(map).get(&user_id).cloned(),
            Backend::Redis { connection_manager, prefix } => {
                let key = Self::context_key(prefix, user_id);
                let mut conn = connection_manager.clone();
                let data: Option<String> = conn.get(&key).await?;
                match data {
                    Some(data) => match serde_json::from_str::<ConversationContext>(&data) {
                        Ok(context) => Some(context),
                        Err(e) => {
                            warn!(user_id = user_id, error = %e, "Discarding unreadable context");
                            self.delete_context(user_id).await?;
                            None
                        }
                    },
                    None => None,
                }
            }
        };

        match context {
            Some(context) if context.is_expired() => {
                debug!(user_id = user_id, pending = %context.pending, "Context has expired, removing");
                self.delete_context(user_id).await?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Delete conversation context; `true` if one existed
    pub async fn delete_context(&self, user_id: i64) -> Result<bool> {
        let deleted = match &self.backend {
            Backend::Memory(map) => Self::memory_map(map).remove(&user_id).is_some(),
            Backend::Redis { connection_manager, prefix } => {
                let key = Self::context_key(prefix, user_id);
                let mut conn = connection_manager.clone();
                let removed: u32 = conn.del(&key).await?;
                removed > 0
            }
        };
        Ok(deleted)
    }

    /// Arm `pending` for `user_id`
    ///
    /// Arming the same expectation again restarts its timer. Arming a
    /// different one while a live context exists fails with
    /// `InvalidStateTransition`.
    pub async fn begin(&self, user_id: i64, pending: PendingInput) -> Result<ConversationContext> {
        if let Some(current) = self.load_context(user_id).await? {
            if current.pending != pending {
                return Err(PageDropError::InvalidStateTransition {
                    from: current.pending.to_string(),
                    to: pending.to_string(),
                });
            }
        }

        let context = ConversationContext::new(user_id, pending, self.timeout);
        self.save_context(&context).await?;
        info!(user_id = user_id, pending = %pending, "Awaiting input");
        Ok(context)
    }

    /// Return the issuer to idle; yields what was pending, if anything
    pub async fn finish(&self, user_id: i64) -> Result<Option<PendingInput>> {
        let current = self.load_context(user_id).await?;
        self.delete_context(user_id).await?;
        Ok(current.map(|context| context.pending))
    }
}

fn seconds(value: u64) -> Duration {
    Duration::seconds(i64::try_from(value).unwrap_or(i64::MAX).min(i64::MAX / 1000))
}
