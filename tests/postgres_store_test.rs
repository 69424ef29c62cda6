//! PostgreSQL store behaviour
//!
//! These need Docker (or `TEST_DATABASE_URL`) and are ignored by default:
//! `cargo test --test postgres_store_test -- --ignored`

mod helpers;

use std::sync::Arc;
use assert_matches::assert_matches;
use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use PageDrop::database::{DailyStatsRepository, DailyStatsStore, UserRepository, UserStore};
use PageDrop::models::{NewUserAccount, QuotaStats, VisitOutcome};
use PageDrop::PageDropError;

use helpers::*;

fn account(chat_id: i64) -> PageDrop::models::UserAccount {
    NewUserAccount {
        chat_id,
        name: Some(format!("user{}", chat_id)),
        base_limit: 2,
        referral_reward: 1,
    }
    .into_account(Utc::now())
}

#[tokio::test]
#[ignore]
async fn test_create_if_absent_and_load() {
    let db = TestDatabase::new().await.expect("database starts");
    db.cleanup().await.unwrap();
    let users = UserRepository::new(db.pool.clone());

    assert!(users.create_if_absent(account(1)).await.unwrap());
    assert!(!users.create_if_absent(account(1)).await.unwrap());

    let loaded = users.get_user(1).await.unwrap().expect("account stored");
    assert_eq!(loaded.name, "user1");
    assert_eq!(loaded.stats.base_limit, 2);
    assert_eq!(users.count_users().await.unwrap(), 1);
}

#[tokio::test]
#[ignore]
async fn test_update_stats_of_missing_account() {
    let db = TestDatabase::new().await.expect("database starts");
    db.cleanup().await.unwrap();
    let users = UserRepository::new(db.pool.clone());

    let result = users.update_stats(404, Box::new(|_stats: &mut QuotaStats| Ok(()))).await;
    assert_matches!(result, Err(PageDropError::UserNotFound { user_id: 404 }));
}

#[tokio::test]
#[ignore]
async fn test_aborted_mutation_writes_nothing() {
    let db = TestDatabase::new().await.expect("database starts");
    db.cleanup().await.unwrap();
    let users = UserRepository::new(db.pool.clone());
    users.create_if_absent(account(1)).await.unwrap();

    let result = users
        .update_stats(
            1,
            Box::new(|stats: &mut QuotaStats| {
                stats.file_count = 99;
                Err(PageDropError::InvalidInput("abort".to_string()))
            }),
        )
        .await;
    assert!(result.is_err());
    assert_eq!(users.get_user(1).await.unwrap().unwrap().stats.file_count, 0);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_referrals_are_serialized() {
    let db = TestDatabase::new().await.expect("database starts");
    db.cleanup().await.unwrap();
    let users = Arc::new(UserRepository::new(db.pool.clone()));
    users.create_if_absent(account(1)).await.unwrap();

    let updates = (100..130).map(|referred| {
        let users = users.clone();
        tokio::spawn(async move {
            users
                .update_stats(
                    1,
                    Box::new(move |stats: &mut QuotaStats| {
                        stats.add_referral(referred);
                        Ok(())
                    }),
                )
                .await
        })
    });
    for joined in join_all(updates).await {
        joined.expect("update task panicked").unwrap();
    }

    let stats = users.get_user(1).await.unwrap().unwrap().stats;
    assert_eq!(stats.referral_count(), 30);
}

#[tokio::test]
#[ignore]
async fn test_daily_visits_are_distinct_under_concurrency() {
    let db = TestDatabase::new().await.expect("database starts");
    db.cleanup().await.unwrap();
    let daily = Arc::new(DailyStatsRepository::new(db.pool.clone()));
    let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

    let visits = (0..40).map(|i| {
        let daily = daily.clone();
        tokio::spawn(async move { daily.record_visit(day, i % 20).await })
    });
    let outcomes: Vec<VisitOutcome> = join_all(visits)
        .await
        .into_iter()
        .map(|joined| joined.expect("visit task panicked").unwrap())
        .collect();

    let record = daily.get_day(day).await.unwrap().expect("record exists");
    assert_eq!(record.count(), 20);
    assert_eq!(outcomes.iter().filter(|o| **o == VisitOutcome::AlreadySeen).count(), 20);
}

#[tokio::test]
#[ignore]
async fn test_connect_checks_pool_and_migrates() {
    let db = TestDatabase::new().await.expect("database starts");
    db.cleanup().await.unwrap();
    let config = PageDrop::config::DatabaseConfig {
        backend: PageDrop::config::StoreBackend::Postgres,
        url: db.database_url.clone(),
        max_connections: 2,
        min_connections: 1,
    };

    let database = PageDrop::DatabaseService::connect(&config).await.unwrap();
    assert_eq!(database.users.count_users().await.unwrap(), 0);

    let pool = PageDrop::database::create_pool(&config).await.unwrap();
    PageDrop::database::health_check(&pool).await.unwrap();
}
