//! Database service layer
//!
//! This module picks the configured store backend and hands out the
//! user and daily-stats stores behind their traits.

use std::sync::Arc;
use tracing::info;
use crate::config::{DatabaseConfig, StoreBackend};
use crate::database::{
    connection::{create_pool, run_migrations},
    DailyStatsRepository, DailyStatsStore, MemoryDailyStatsStore, MemoryUserStore,
    UserRepository, UserStore,
};
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: Arc<dyn UserStore>,
    pub daily_stats: Arc<dyn DailyStatsStore>,
}

impl DatabaseService {
    pub fn new(users: Arc<dyn UserStore>, daily_stats: Arc<dyn DailyStatsStore>) -> Self {
        Self { users, daily_stats }
    }

    /// Connect to the configured backend, running migrations for Postgres
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        match config.backend {
            StoreBackend::Postgres => {
                info!("Connecting to database...");
                let pool = create_pool(config).await?;
                run_migrations(&pool).await?;

                Ok(Self::new(
                    Arc::new(UserRepository::new(pool.clone())),
                    Arc::new(DailyStatsRepository::new(pool)),
                ))
            }
            StoreBackend::Memory => {
                info!("Using in-memory store; user records will not survive a restart");
                Ok(Self::in_memory())
            }
        }
    }

    /// Fresh in-process stores
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryDailyStatsStore::new()),
        )
    }
}
