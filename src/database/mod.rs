//! Database module
//!
//! This module handles database connections and the user/daily-stats stores

pub mod connection;
pub mod store;
pub mod repositories;
pub mod service;

// Re-export commonly used database components
pub use connection::{DatabasePool, create_pool, run_migrations, health_check};
pub use store::{UserStore, DailyStatsStore, StatsMutation};
pub use repositories::{UserRepository, DailyStatsRepository, MemoryUserStore, MemoryDailyStatsStore};
pub use service::DatabaseService;
