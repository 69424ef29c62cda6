//! Referral crediting
//!
//! A referrer gains slots once per distinct referred identity, whatever the
//! interleaving of `/start` deliveries.

mod helpers;

use std::sync::Arc;
use assert_matches::assert_matches;
use futures::future::join_all;
use PageDrop::services::ReferralOutcome;

use helpers::*;

#[tokio::test]
async fn test_referral_credits_referrer_and_notifies() {
    let ctx = TestContext::new();
    ctx.register(1).await;
    ctx.register(2).await;

    let outcome = ctx.services.referral_service.apply_referral(1, 2).await.unwrap();
    let stats = assert_matches!(outcome, ReferralOutcome::Credited(stats) => stats);
    assert_eq!(stats.referral_count(), 1);
    assert_eq!(stats.total_slots(), 3);

    let notices = ctx.sender.texts_to(1);
    assert_eq!(notices.len(), 1);
    assert!(notices[0].contains("3 slots"));
}

#[tokio::test]
async fn test_repeated_referral_is_credited_once() {
    let ctx = TestContext::new();
    ctx.register(1).await;
    ctx.register(2).await;

    ctx.services.referral_service.apply_referral(1, 2).await.unwrap();
    let second = ctx.services.referral_service.apply_referral(1, 2).await.unwrap();
    assert_eq!(second, ReferralOutcome::AlreadyCredited);

    let stats = ctx.services.quota_service.get_stats(1).await.unwrap();
    assert_eq!(stats.referral_count(), 1);
    assert_eq!(ctx.sender.texts_to(1).len(), 1);
}

#[tokio::test]
async fn test_self_referral_is_ignored() {
    let ctx = TestContext::new();
    ctx.register(1).await;

    let outcome = ctx.services.referral_service.apply_referral(1, 1).await.unwrap();
    assert_eq!(outcome, ReferralOutcome::SelfReferral);
    assert_eq!(ctx.services.quota_service.get_stats(1).await.unwrap().referral_count(), 0);
    assert!(ctx.sender.sent().is_empty());
}

#[tokio::test]
async fn test_unknown_referrer_is_skipped() {
    let ctx = TestContext::new();
    ctx.register(2).await;

    let outcome = ctx.services.referral_service.apply_referral(777, 2).await.unwrap();
    assert_eq!(outcome, ReferralOutcome::UnknownReferrer);
    assert!(ctx.services.user_service.get_user(777).await.unwrap().is_none());
}

#[tokio::test]
async fn test_credit_survives_failed_notification() {
    let ctx = TestContext::new();
    ctx.register(1).await;
    ctx.register(2).await;
    ctx.sender.fail_for([1]);

    let outcome = ctx.services.referral_service.apply_referral(1, 2).await.unwrap();
    assert_matches!(outcome, ReferralOutcome::Credited(_));
    assert_eq!(ctx.services.quota_service.get_stats(1).await.unwrap().referral_count(), 1);
}

#[tokio::test]
async fn test_referral_uses_referrers_own_reward() {
    let ctx = TestContext::new();
    ctx.register(1).await;
    ctx.register(2).await;
    ctx.register(3).await;

    ctx.services.admin_config_service.set_referral_reward(4).await.unwrap();
    ctx.services.referral_service.apply_referral(1, 2).await.unwrap();
    ctx.services.referral_service.apply_referral(1, 3).await.unwrap();

    let stats = ctx.services.quota_service.get_stats(1).await.unwrap();
    assert_eq!(stats.referral_slots(), 8);
    assert_eq!(stats.total_slots(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_distinct_referrals_all_count() {
    let ctx = Arc::new(TestContext::new());
    ctx.register(1).await;
    for id in 100..120 {
        ctx.register(id).await;
    }

    let credits = (100..120).map(|id| {
        let ctx = ctx.clone();
        tokio::spawn(async move { ctx.services.referral_service.apply_referral(1, id).await })
    });
    for joined in join_all(credits).await {
        assert_matches!(joined.expect("referral task panicked"), Ok(ReferralOutcome::Credited(_)));
    }

    let stats = ctx.services.quota_service.get_stats(1).await.unwrap();
    assert_eq!(stats.referral_count(), 20);
    assert_eq!(stats.total_slots(), 22);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_referrals_credit_once() {
    let ctx = Arc::new(TestContext::new());
    ctx.register(1).await;
    ctx.register(2).await;

    let credits = (0..10).map(|_| {
        let ctx = ctx.clone();
        tokio::spawn(async move { ctx.services.referral_service.apply_referral(1, 2).await })
    });
    let outcomes: Vec<ReferralOutcome> = join_all(credits)
        .await
        .into_iter()
        .map(|joined| joined.expect("referral task panicked").unwrap())
        .collect();

    let credited = outcomes
        .iter()
        .filter(|o| matches!(o, ReferralOutcome::Credited(_)))
        .count();
    assert_eq!(credited, 1);
    assert_eq!(ctx.services.quota_service.get_stats(1).await.unwrap().referral_count(), 1);
}

#[tokio::test]
async fn test_referral_then_uploads_scenario() {
    // A invites B; B joins through the link; A can now host three files.
    let ctx = TestContext::new();
    ctx.register(10).await;
    let (_, created) = ctx
        .services
        .user_service
        .register_or_get_user(20, Some("B".to_string()))
        .await
        .unwrap();
    assert!(created);
    ctx.services.referral_service.apply_referral(10, 20).await.unwrap();

    for name in ["one.html", "two.html", "three.zip"] {
        ctx.upload(10, name).await.unwrap();
    }
    assert!(ctx.upload(10, "four.html").await.is_err());

    let b = ctx.services.quota_service.get_stats(20).await.unwrap();
    assert_eq!(b.referral_count(), 0);
    assert_eq!(b.total_slots(), 2);
}
