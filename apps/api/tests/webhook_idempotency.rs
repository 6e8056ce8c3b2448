mod common;

use chrono::{Duration, Utc};
use control_plane_db::{PaymentEventRepository, SubscriptionRepository, UserRepository};
use control_plane_models::SubscriptionState;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use common::{sign, test_state, WEBHOOK_SECRET};

fn activated_body(provider_subscription_id: &str, provider_event_id: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "event_type": "subscription.activated",
        "provider_event_id": provider_event_id,
        "provider_subscription_id": provider_subscription_id,
        "period_start": Utc::now() - Duration::minutes(1),
        "period_end": Utc::now() + Duration::days(30),
    }))
    .unwrap()
}

/// The same delivery arriving twice (the provider's documented at-least-once
/// retry behavior) must apply the transition exactly once and leave the
/// second delivery recorded in the ledger as a rejected duplicate, never
/// re-applied.
#[sqlx::test(migrations = "../../libs/infra/db/migrations")]
async fn duplicate_webhook_delivery_applies_the_transition_once(pool: PgPool) {
    let state = test_state(pool.clone());

    let user_id = Uuid::new_v4();
    UserRepository::insert(&pool, user_id, "owner@example.com", "irrelevant-digest")
        .await
        .unwrap();
    let subscription = SubscriptionRepository::insert(&pool, Uuid::new_v4(), user_id, "pro", Some("sub_dup_test"))
        .await
        .unwrap();
    assert_eq!(subscription.state, SubscriptionState::Pending);

    let body = activated_body("sub_dup_test", "evt_dup_test");
    let signature = sign(WEBHOOK_SECRET, &body);

    state.subscriptions.process_webhook(&body, Some(&signature)).await.unwrap();
    state.subscriptions.process_webhook(&body, Some(&signature)).await.unwrap();

    let reloaded = SubscriptionRepository::find_by_id(&pool, subscription.id).await.unwrap().unwrap();
    assert_eq!(reloaded.state, SubscriptionState::Active);
    assert!(reloaded.period_end.is_some());

    let ledger = PaymentEventRepository::list_by_subscription(&pool, subscription.id).await.unwrap();
    assert_eq!(ledger.len(), 1, "the duplicate delivery must not add a second ledger row");
}

/// Once a subscription reaches a terminal state, later events referencing
/// it are still recorded in the ledger but never mutate the row — the
/// "cancelled" stickiness the state machine guarantees.
#[sqlx::test(migrations = "../../libs/infra/db/migrations")]
async fn events_after_cancellation_are_recorded_but_never_reopen_the_subscription(pool: PgPool) {
    let state = test_state(pool.clone());

    let user_id = Uuid::new_v4();
    UserRepository::insert(&pool, user_id, "cancelled-owner@example.com", "irrelevant-digest")
        .await
        .unwrap();
    let subscription = SubscriptionRepository::insert(&pool, Uuid::new_v4(), user_id, "pro", Some("sub_term_test"))
        .await
        .unwrap();

    SubscriptionRepository::apply_transition(
        &pool,
        subscription.id,
        SubscriptionState::Cancelled,
        None,
        None,
        Some(Utc::now()),
    )
    .await
    .unwrap();

    let charged_body = serde_json::to_vec(&json!({
        "event_type": "subscription.charged",
        "provider_event_id": "evt_after_cancel",
        "provider_subscription_id": "sub_term_test",
        "amount_minor_units": 2900,
        "currency": "usd",
    }))
    .unwrap();
    let signature = sign(WEBHOOK_SECRET, &charged_body);

    state.subscriptions.process_webhook(&charged_body, Some(&signature)).await.unwrap();

    let reloaded = SubscriptionRepository::find_by_id(&pool, subscription.id).await.unwrap().unwrap();
    assert_eq!(reloaded.state, SubscriptionState::Cancelled);

    let stored = PaymentEventRepository::find_by_provider_event_id(&pool, "evt_after_cancel")
        .await
        .unwrap();
    assert!(stored.is_some(), "the event is still recorded for audit purposes");
}

/// A tampered body fails signature verification before any ledger row is
/// written, and the provider-facing caller (the webhook handler) should
/// retry it rather than treat it as delivered.
#[sqlx::test(migrations = "../../libs/infra/db/migrations")]
async fn tampered_body_is_rejected_and_nothing_is_recorded(pool: PgPool) {
    let state = test_state(pool.clone());

    let body = activated_body("sub_never_created", "evt_tampered");
    let signature = sign(WEBHOOK_SECRET, &body);
    let tampered = activated_body("sub_never_created", "evt_tampered_other");

    let result = state.subscriptions.process_webhook(&tampered, Some(&signature)).await;
    assert!(result.is_err());

    let stored = PaymentEventRepository::find_by_provider_event_id(&pool, "evt_tampered").await.unwrap();
    assert!(stored.is_none());
    let stored_other = PaymentEventRepository::find_by_provider_event_id(&pool, "evt_tampered_other").await.unwrap();
    assert!(stored_other.is_none());
}
