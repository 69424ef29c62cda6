//! Daily usage repository implementation

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use crate::database::store::DailyStatsStore;
use crate::models::{DailyStatsRecord, VisitOutcome};
use crate::utils::errors::Result;

#[derive(Clone)]
#[derive(Debug)]
pub struct DailyStatsRepository {
    pool: PgPool,
}

impl DailyStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DailyStatsStore for DailyStatsRepository {
    async fn record_visit(&self, day: NaiveDate, user_id: i64) -> Result<VisitOutcome> {
        // Single statement: the conflict arm only fires for unseen users, so
        // two first contacts on the same day cannot overwrite each other.
        let row: Option<(i32, bool)> = sqlx::query_as(
            r#"
            INSERT INTO daily_stats (day, users, count)
            VALUES ($1, ARRAY[$2::BIGINT], 1)
            ON CONFLICT (day) DO UPDATE
                SET users = array_append(daily_stats.users, $2::BIGINT),
                    count = daily_stats.count + 1
                WHERE NOT ($2::BIGINT = ANY(daily_stats.users))
            RETURNING count, (xmax = 0) AS inserted
            "#
        )
        .bind(day)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some((_, true)) => VisitOutcome::Created,
            Some((_, false)) => VisitOutcome::Added,
            None => VisitOutcome::AlreadySeen,
        })
    }

    async fn get_day(&self, day: NaiveDate) -> Result<Option<DailyStatsRecord>> {
        let row: Option<(Vec<i64>,)> = sqlx::query_as(
            "SELECT users FROM daily_stats WHERE day = $1"
        )
        .bind(day)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(users,)| DailyStatsRecord::from_users(day, users)))
    }
}
