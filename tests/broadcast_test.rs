//! Broadcast fan-out

mod helpers;

use std::collections::BTreeSet;
use std::time::Instant;
use PageDrop::models::BroadcastPayload;

use helpers::*;

#[tokio::test]
async fn test_broadcast_reaches_every_account() {
    let ctx = TestContext::new();
    for id in 1..=6 {
        ctx.register(id).await;
    }

    let payload = BroadcastPayload::Text("Maintenance tonight".to_string());
    let report = ctx.services.broadcast_service.broadcast(&payload).await.unwrap();

    assert_eq!(report.total, 6);
    assert_eq!(report.delivered, 6);
    assert!(report.failed.is_empty());

    let recipients: BTreeSet<i64> = ctx.sender.sent().iter().map(|m| m.chat_id()).collect();
    assert_eq!(recipients, (1..=6).collect());
    assert!(ctx.sender.sent().iter().all(|m| matches!(
        m,
        SentMessage::Payload { payload: BroadcastPayload::Text(text), .. } if text == "Maintenance tonight"
    )));
}

#[tokio::test]
async fn test_failed_recipients_are_reported_and_do_not_stop_fan_out() {
    let ctx = TestContext::new();
    for id in 1..=10 {
        ctx.register(id).await;
    }
    ctx.sender.fail_for([7, 3]);

    let payload = BroadcastPayload::Photo {
        file_id: "AgACAgIAAxkBAAIB".to_string(),
        caption: Some("New feature".to_string()),
    };
    let report = ctx.services.broadcast_service.broadcast(&payload).await.unwrap();

    assert_eq!(report.total, 10);
    assert_eq!(report.delivered, 8);
    assert_eq!(report.failed, vec![3, 7]);
    assert_eq!(ctx.sender.sent().len(), 8);
}

#[tokio::test]
async fn test_broadcast_with_no_accounts() {
    let ctx = TestContext::new();
    let report = ctx
        .services
        .broadcast_service
        .broadcast(&BroadcastPayload::Text("hello".to_string()))
        .await
        .unwrap();
    assert_eq!(report.total, 0);
    assert_eq!(report.delivered, 0);
}

#[tokio::test]
async fn test_fan_out_is_rate_limited() {
    let ctx = TestContext::with_config(TestConfig {
        messages_per_second: 5,
        concurrency: 4,
        ..TestConfig::default()
    });
    for id in 1..=10 {
        ctx.register(id).await;
    }

    let started = Instant::now();
    let report = ctx
        .services
        .broadcast_service
        .broadcast(&BroadcastPayload::Text("slow down".to_string()))
        .await
        .unwrap();

    assert_eq!(report.delivered, 10);
    // 5 burst cells, the remaining 5 at 200ms each
    assert!(started.elapsed().as_millis() >= 800);
}

#[tokio::test]
async fn test_gate_is_shared_through_the_factory() {
    let ctx = TestContext::new();
    let gate = ctx.services.broadcast_service.gate();

    gate.arm(TEST_ADMIN_ID).unwrap();
    assert!(ctx.services.broadcast_service.gate().is_armed_by(TEST_ADMIN_ID));
    assert!(gate.take(TEST_ADMIN_ID));
    assert!(!ctx.services.broadcast_service.gate().is_armed_by(TEST_ADMIN_ID));
}
