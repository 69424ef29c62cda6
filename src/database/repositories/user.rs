//! User repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, types::Json};
use tracing::debug;
use crate::database::store::{StatsMutation, UserStore};
use crate::models::user::{QuotaStats, UserAccount};
use crate::utils::errors::{PageDropError, Result};

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

#[derive(FromRow)]
struct UserRow {
    chat_id: i64,
    name: String,
    joined_at: DateTime<Utc>,
    stats: Json<QuotaStats>,
}

impl From<UserRow> for UserAccount {
    fn from(row: UserRow) -> Self {
        UserAccount {
            chat_id: row.chat_id,
            name: row.name,
            joined_at: row.joined_at,
            stats: row.stats.0,
        }
    }
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn get_user(&self, chat_id: i64) -> Result<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT chat_id, name, joined_at, stats FROM users WHERE chat_id = $1"
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserAccount::from))
    }

    async fn create_if_absent(&self, account: UserAccount) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (chat_id, name, joined_at, stats, updated_at)
            VALUES ($1, $2, $3, $4, $3)
            ON CONFLICT (chat_id) DO NOTHING
            "#
        )
        .bind(account.chat_id)
        .bind(&account.name)
        .bind(account.joined_at)
        .bind(Json(&account.stats))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_users(&self) -> Result<Vec<UserAccount>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT chat_id, name, joined_at, stats FROM users ORDER BY joined_at ASC, chat_id ASC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserAccount::from).collect())
    }

    async fn count_users(&self) -> Result<u64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count.0).unwrap_or(0))
    }

    async fn update_stats(&self, chat_id: i64, mutation: StatsMutation) -> Result<QuotaStats> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent updates of the same account
        let row: Option<(Json<QuotaStats>,)> = sqlx::query_as(
            "SELECT stats FROM users WHERE chat_id = $1 FOR UPDATE"
        )
        .bind(chat_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((Json(mut stats),)) = row else {
            return Err(PageDropError::UserNotFound { user_id: chat_id });
        };

        mutation(&mut stats)?;

        sqlx::query("UPDATE users SET stats = $2, updated_at = NOW() WHERE chat_id = $1")
            .bind(chat_id)
            .bind(Json(&stats))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(chat_id = chat_id, file_count = stats.file_count, "User stats updated");

        Ok(stats)
    }
}
