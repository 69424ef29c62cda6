//! Database repositories module
//! 
//! This module contains all repository implementations for data access

pub mod user;
pub mod daily_stats;
pub mod memory;

// Re-export repositories
pub use user::UserRepository;
pub use daily_stats::DailyStatsRepository;
pub use memory::{MemoryUserStore, MemoryDailyStatsStore};
