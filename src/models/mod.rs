//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod daily_stats;
pub mod upload;
pub mod broadcast;

// Re-export commonly used models
pub use user::{UserAccount, QuotaStats, NewUserAccount};
pub use daily_stats::{DailyStatsRecord, VisitOutcome};
pub use upload::StoredObject;
pub use broadcast::{BroadcastPayload, BroadcastReport};
