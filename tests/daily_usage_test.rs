//! Daily distinct-user tracking

mod helpers;

use std::sync::Arc;
use chrono::NaiveDate;
use futures::future::join_all;
use PageDrop::models::VisitOutcome;

use helpers::*;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

#[tokio::test]
async fn test_repeat_visits_count_once() {
    let ctx = TestContext::new();
    let usage = &ctx.services.daily_usage_service;

    assert_eq!(usage.track_on(day(1), 5).await.unwrap(), VisitOutcome::Created);
    assert_eq!(usage.track_on(day(1), 5).await.unwrap(), VisitOutcome::AlreadySeen);
    assert_eq!(usage.track_on(day(1), 6).await.unwrap(), VisitOutcome::Added);
    assert_eq!(usage.count_on(day(1)).await.unwrap(), 2);
}

#[tokio::test]
async fn test_days_are_counted_separately() {
    let ctx = TestContext::new();
    let usage = &ctx.services.daily_usage_service;

    usage.track_on(day(1), 5).await.unwrap();
    usage.track_on(day(2), 5).await.unwrap();
    usage.track_on(day(2), 6).await.unwrap();

    assert_eq!(usage.count_on(day(1)).await.unwrap(), 1);
    assert_eq!(usage.count_on(day(2)).await.unwrap(), 2);
    assert_eq!(usage.count_on(day(3)).await.unwrap(), 0);
}

#[tokio::test]
async fn test_track_counts_today() {
    let ctx = TestContext::new();
    ctx.services.daily_usage_service.track(1).await.unwrap();
    ctx.services.daily_usage_service.track(2).await.unwrap();
    assert_eq!(ctx.services.daily_usage_service.today_count().await.unwrap(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_visits_are_all_counted() {
    let ctx = Arc::new(TestContext::new());

    // every user arrives twice at roughly the same moment
    let visits = (0..100).map(|i| {
        let ctx = ctx.clone();
        tokio::spawn(async move { ctx.services.daily_usage_service.track_on(day(9), i / 2).await })
    });
    let outcomes: Vec<VisitOutcome> = join_all(visits)
        .await
        .into_iter()
        .map(|joined| joined.expect("visit task panicked").unwrap())
        .collect();

    assert_eq!(ctx.services.daily_usage_service.count_on(day(9)).await.unwrap(), 50);
    let created = outcomes.iter().filter(|o| **o == VisitOutcome::Created).count();
    let seen = outcomes.iter().filter(|o| **o == VisitOutcome::AlreadySeen).count();
    assert_eq!(created, 1);
    assert_eq!(seen, 50);
}
