//! Daily usage tracker

use std::sync::Arc;
use chrono::{NaiveDate, Utc};
use tracing::debug;
use crate::database::DailyStatsStore;
use crate::models::VisitOutcome;
use crate::utils::errors::Result;
use crate::utils::helpers::utc_day;

#[derive(Debug, Clone)]
pub struct DailyUsageService {
    store: Arc<dyn DailyStatsStore>,
}

impl DailyUsageService {
    pub fn new(store: Arc<dyn DailyStatsStore>) -> Self {
        Self { store }
    }

    /// Record that `user_id` showed up today (UTC)
    pub async fn track(&self, user_id: i64) -> Result<VisitOutcome> {
        self.track_on(utc_day(Utc::now()), user_id).await
    }

    pub async fn track_on(&self, day: NaiveDate, user_id: i64) -> Result<VisitOutcome> {
        let outcome = self.store.record_visit(day, user_id).await?;
        debug!(user_id = user_id, day = %day, outcome = ?outcome, "Daily visit recorded");
        Ok(outcome)
    }

    /// Distinct users seen on `day`
    pub async fn count_on(&self, day: NaiveDate) -> Result<u32> {
        Ok(self.store.get_day(day).await?.map(|record| record.count()).unwrap_or(0))
    }

    pub async fn today_count(&self) -> Result<u32> {
        self.count_on(utc_day(Utc::now())).await
    }
}
