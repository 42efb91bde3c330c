//! Integration tests for webhook intake and billing reconciliation.
//!
//! Events go through `WebhookIntake::receive`, exactly as the HTTP endpoint
//! hands them over, and state is inspected through the ports.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{event, subscription_event, Harness, T0};
use saas_core::domain::alert::AlertKind;
use saas_core::domain::billing::{
    signature_header, ReconcileError, ReconcileOutcome, CLAIM_LEASE_SECS,
};
use saas_core::domain::integration::Integration;
use saas_core::domain::subscription::{BillingStatus, PlanType};
use saas_core::domain::user::AccountStatus;
use saas_core::ports::{
    AlertSink, EntitlementStore, EventDisposition, IntegrationRepository, UserRepository,
    WebhookEventRecord, WebhookEventRepository, WebhookResult,
};

const CREATED: &str = "customer.subscription.created";
const UPDATED: &str = "customer.subscription.updated";
const DELETED: &str = "customer.subscription.deleted";

async fn deliver(h: &Harness, body: &[u8]) -> Result<WebhookResult, ReconcileError> {
    h.state.webhooks.receive(body, None).await
}

async fn status_of(h: &Harness, user_id: &saas_core::domain::foundation::UserId) -> AccountStatus {
    h.store
        .find_by_id(user_id)
        .await
        .unwrap()
        .expect("user exists")
        .subscription_status
}

// ════════════════════════════════════════════════════════════════════════════════
// Subscription lifecycle
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn created_event_sets_status_row_and_welcome_alert() {
    let h = Harness::new();
    let user = h.register("a@x.com").await.user;
    h.bind_customer(&user.id, "cus_1").await;

    let body = subscription_event("evt_1", CREATED, T0, "sub_1", "cus_1", "trialing", "pro");
    let result = deliver(&h, &body).await.unwrap();

    assert_eq!(result, WebhookResult::Processed(ReconcileOutcome::Applied));
    assert_eq!(status_of(&h, &user.id).await, AccountStatus::Trialing);
    assert_eq!(h.store.subscription_count_for_billing_id("sub_1").await, 1);

    let row = h.store.find_by_billing_id("sub_1").await.unwrap().unwrap();
    assert_eq!(row.user_id, user.id);
    assert_eq!(row.plan_type, PlanType::Pro);

    let alerts = AlertSink::list_for_user(&h.store, &user.id, 10).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::SubscriptionCreated);
}

#[tokio::test]
async fn redelivered_event_changes_nothing() {
    let h = Harness::new();
    let user = h.register("a@x.com").await.user;
    h.bind_customer(&user.id, "cus_1").await;
    let body = subscription_event("evt_1", CREATED, T0, "sub_1", "cus_1", "trialing", "pro");

    deliver(&h, &body).await.unwrap();
    let before = h.store.find_by_billing_id("sub_1").await.unwrap().unwrap();

    let again = deliver(&h, &body).await.unwrap();

    assert_eq!(again, WebhookResult::AlreadyProcessed);
    assert_eq!(h.store.subscription_count_for_billing_id("sub_1").await, 1);
    assert_eq!(h.store.find_by_billing_id("sub_1").await.unwrap().unwrap(), before);
    assert_eq!(h.store.alert_count_for_user(&user.id).await, 1);
}

#[tokio::test]
async fn same_subscription_under_new_event_id_updates_in_place() {
    let h = Harness::new();
    let user = h.register("a@x.com").await.user;
    h.bind_customer(&user.id, "cus_1").await;

    deliver(&h, &subscription_event("evt_1", CREATED, T0, "sub_1", "cus_1", "trialing", "pro"))
        .await
        .unwrap();
    deliver(&h, &subscription_event("evt_2", CREATED, T0 + 5, "sub_1", "cus_1", "active", "pro"))
        .await
        .unwrap();

    assert_eq!(h.store.subscription_count_for_billing_id("sub_1").await, 1);
    assert_eq!(status_of(&h, &user.id).await, AccountStatus::Active);
    // Welcome alert only on row creation.
    assert_eq!(h.store.alert_count_for_user(&user.id).await, 1);
}

#[tokio::test]
async fn deleted_event_cancels_row_and_frees_user() {
    let h = Harness::new();
    let user = h.register("a@x.com").await.user;
    h.bind_customer(&user.id, "cus_1").await;
    deliver(&h, &subscription_event("evt_1", CREATED, T0, "sub_1", "cus_1", "trialing", "pro"))
        .await
        .unwrap();

    h.clock.advance_secs(60);
    let result = deliver(
        &h,
        &subscription_event("evt_2", DELETED, T0 + 60, "sub_1", "cus_1", "canceled", "pro"),
    )
    .await
    .unwrap();

    assert_eq!(result, WebhookResult::Processed(ReconcileOutcome::Applied));
    assert_eq!(status_of(&h, &user.id).await, AccountStatus::Free);

    let row = h.store.find_by_billing_id("sub_1").await.unwrap().unwrap();
    assert_eq!(row.status, BillingStatus::Canceled);

    let alerts = AlertSink::list_for_user(&h.store, &user.id, 10).await.unwrap();
    assert_eq!(alerts[0].kind, AlertKind::SubscriptionCanceled);
}

#[tokio::test]
async fn unknown_customer_is_acknowledged_without_mutation() {
    let h = Harness::new();
    let user = h.register("a@x.com").await.user;

    let result = deliver(
        &h,
        &subscription_event("evt_1", CREATED, T0, "sub_9", "cus_nobody", "active", "pro"),
    )
    .await
    .unwrap();

    assert!(matches!(
        result,
        WebhookResult::Processed(ReconcileOutcome::SoftMiss(_))
    ));
    assert_eq!(h.store.subscription_count_for_billing_id("sub_9").await, 0);
    assert_eq!(status_of(&h, &user.id).await, AccountStatus::Free);
    assert_eq!(h.store.alert_count_for_user(&user.id).await, 0);
}

#[tokio::test]
async fn older_update_is_stale_and_leaves_row_unchanged() {
    let h = Harness::new();
    let user = h.register("a@x.com").await.user;
    h.bind_customer(&user.id, "cus_1").await;
    deliver(&h, &subscription_event("evt_1", CREATED, T0 + 100, "sub_1", "cus_1", "active", "pro"))
        .await
        .unwrap();
    let before = h.store.find_by_billing_id("sub_1").await.unwrap().unwrap();

    let result = deliver(
        &h,
        &subscription_event("evt_0", UPDATED, T0, "sub_1", "cus_1", "past_due", "starter"),
    )
    .await
    .unwrap();

    assert_eq!(result, WebhookResult::Processed(ReconcileOutcome::Stale));
    assert_eq!(h.store.find_by_billing_id("sub_1").await.unwrap().unwrap(), before);
    assert_eq!(status_of(&h, &user.id).await, AccountStatus::Active);
}

#[tokio::test]
async fn update_changes_plan_and_status() {
    let h = Harness::new();
    let user = h.register("a@x.com").await.user;
    h.bind_customer(&user.id, "cus_1").await;
    deliver(&h, &subscription_event("evt_1", CREATED, T0, "sub_1", "cus_1", "active", "starter"))
        .await
        .unwrap();

    deliver(
        &h,
        &subscription_event("evt_2", UPDATED, T0 + 10, "sub_1", "cus_1", "past_due", "enterprise"),
    )
    .await
    .unwrap();

    let row = h.store.find_by_billing_id("sub_1").await.unwrap().unwrap();
    assert_eq!(row.plan_type, PlanType::Enterprise);
    assert_eq!(status_of(&h, &user.id).await, AccountStatus::PastDue);
    assert_eq!(h.store.alert_count_for_user(&user.id).await, 2);
}

#[tokio::test]
async fn update_before_create_seeds_row_and_late_create_is_stale() {
    let h = Harness::new();
    let user = h.register("a@x.com").await.user;
    h.bind_customer(&user.id, "cus_1").await;

    let first = deliver(
        &h,
        &subscription_event("evt_2", UPDATED, T0 + 10, "sub_1", "cus_1", "active", "pro"),
    )
    .await
    .unwrap();
    let late = deliver(
        &h,
        &subscription_event("evt_1", CREATED, T0, "sub_1", "cus_1", "incomplete", "pro"),
    )
    .await
    .unwrap();

    assert_eq!(first, WebhookResult::Processed(ReconcileOutcome::Applied));
    assert_eq!(late, WebhookResult::Processed(ReconcileOutcome::Stale));
    let row = h.store.find_by_billing_id("sub_1").await.unwrap().unwrap();
    assert_eq!(row.status, BillingStatus::Active);
    assert_eq!(row.user_id, user.id);
    assert_eq!(status_of(&h, &user.id).await, AccountStatus::Active);
    assert_eq!(h.store.subscription_count_for_billing_id("sub_1").await, 1);

    let alerts = AlertSink::list_for_user(&h.store, &user.id, 10).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::SubscriptionCreated);
}

#[tokio::test]
async fn delete_before_create_leaves_user_free() {
    let h = Harness::new();
    let user = h.register("a@x.com").await.user;
    h.bind_customer(&user.id, "cus_1").await;

    let first = deliver(
        &h,
        &subscription_event("evt_3", DELETED, T0 + 20, "sub_1", "cus_1", "canceled", "pro"),
    )
    .await
    .unwrap();
    let late = deliver(&h, &subscription_event("evt_1", CREATED, T0, "sub_1", "cus_1", "active", "pro"))
        .await
        .unwrap();

    assert_eq!(first, WebhookResult::Processed(ReconcileOutcome::Applied));
    assert_eq!(late, WebhookResult::Processed(ReconcileOutcome::Stale));
    let row = h.store.find_by_billing_id("sub_1").await.unwrap().unwrap();
    assert_eq!(row.status, BillingStatus::Canceled);
    assert_eq!(status_of(&h, &user.id).await, AccountStatus::Free);
}

#[tokio::test]
async fn update_for_unknown_row_and_customer_is_soft_miss() {
    let h = Harness::new();

    let result = deliver(
        &h,
        &subscription_event("evt_2", UPDATED, T0, "sub_1", "cus_nobody", "active", "pro"),
    )
    .await
    .unwrap();

    assert!(matches!(
        result,
        WebhookResult::Processed(ReconcileOutcome::SoftMiss(_))
    ));
    assert_eq!(h.store.subscription_count_for_billing_id("sub_1").await, 0);
}

// ════════════════════════════════════════════════════════════════════════════════
// Integrations and cascade
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn cancellation_deactivates_premium_integrations_only() {
    let h = Harness::new();
    let user = h.register("a@x.com").await.user;
    h.bind_customer(&user.id, "cus_1").await;

    let premium = Integration::new(user.id, "salesforce", "CRM sync", true, h.clock_now()).unwrap();
    let basic = Integration::new(user.id, "slack", "Notifications", false, h.clock_now()).unwrap();
    IntegrationRepository::save(&h.store, &premium).await.unwrap();
    IntegrationRepository::save(&h.store, &basic).await.unwrap();

    deliver(&h, &subscription_event("evt_1", CREATED, T0, "sub_1", "cus_1", "active", "pro"))
        .await
        .unwrap();
    deliver(&h, &subscription_event("evt_2", DELETED, T0 + 1, "sub_1", "cus_1", "canceled", "pro"))
        .await
        .unwrap();

    let integrations = IntegrationRepository::list_for_user(&h.store, &user.id).await.unwrap();
    let premium_now = integrations.iter().find(|i| i.id == premium.id).unwrap();
    let basic_now = integrations.iter().find(|i| i.id == basic.id).unwrap();
    assert!(!premium_now.is_active);
    assert!(basic_now.is_active);
}

#[tokio::test]
async fn deleting_user_leaves_no_orphans() {
    let h = Harness::new();
    let user = h.register("a@x.com").await.user;
    h.bind_customer(&user.id, "cus_1").await;
    deliver(&h, &subscription_event("evt_1", CREATED, T0, "sub_1", "cus_1", "active", "pro"))
        .await
        .unwrap();
    assert!(h.store.orphan_count(&user.id).await > 0);

    assert!(UserRepository::delete(&h.store, &user.id).await.unwrap());

    assert_eq!(h.store.orphan_count(&user.id).await, 0);
}

// ════════════════════════════════════════════════════════════════════════════════
// Customer binding and invoices
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn customer_created_binds_by_email_once() {
    let h = Harness::new();
    let user = h.register("a@x.com").await.user;

    let first = event(
        "evt_c1",
        "customer.created",
        T0,
        json!({ "id": "cus_1", "email": "A@X.com" }),
    );
    let result = deliver(&h, &first).await.unwrap();
    assert_eq!(result, WebhookResult::Processed(ReconcileOutcome::Applied));

    let bound = h.store.find_by_billing_customer("cus_1").await.unwrap().unwrap();
    assert_eq!(bound.id, user.id);

    let second = event(
        "evt_c2",
        "customer.created",
        T0 + 1,
        json!({ "id": "cus_2", "email": "a@x.com" }),
    );
    let result = deliver(&h, &second).await.unwrap();
    assert!(matches!(
        result,
        WebhookResult::Processed(ReconcileOutcome::SoftMiss(_))
    ));
    assert!(h.store.find_by_billing_customer("cus_2").await.unwrap().is_none());
}

#[tokio::test]
async fn payment_failed_raises_error_alert() {
    let h = Harness::new();
    let user = h.register("a@x.com").await.user;
    h.bind_customer(&user.id, "cus_1").await;

    let body = event(
        "evt_inv",
        "invoice.payment_failed",
        T0,
        json!({ "id": "in_1", "customer": "cus_1", "amount_due": 4900, "currency": "usd" }),
    );
    deliver(&h, &body).await.unwrap();

    let alerts = AlertSink::list_for_user(&h.store, &user.id, 10).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::PaymentFailed);
}

#[tokio::test]
async fn unhandled_event_kind_is_ignored_and_recorded() {
    let h = Harness::new();
    let body = event("evt_x", "charge.refunded", T0, json!({}));

    let result = deliver(&h, &body).await.unwrap();

    assert_eq!(result.outcome_name(), "ignored");
    let record = h.store.find_by_event_id("evt_x").await.unwrap().unwrap();
    assert_eq!(record.disposition, EventDisposition::Ignored);
}

// ════════════════════════════════════════════════════════════════════════════════
// Failure handling
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn storage_outage_is_retryable_and_not_recorded() {
    let h = Harness::new();
    let user = h.register("a@x.com").await.user;
    h.bind_customer(&user.id, "cus_1").await;
    let body = subscription_event("evt_1", CREATED, T0, "sub_1", "cus_1", "active", "pro");

    h.store.set_unavailable(true);
    let err = deliver(&h, &body).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    h.store.set_unavailable(false);
    let result = deliver(&h, &body).await.unwrap();
    assert_eq!(result, WebhookResult::Processed(ReconcileOutcome::Applied));
}

#[tokio::test]
async fn delivery_in_flight_elsewhere_is_retryable_until_lease_expires() {
    let h = Harness::new();
    let user = h.register("a@x.com").await.user;
    h.bind_customer(&user.id, "cus_1").await;
    let body = subscription_event("evt_1", CREATED, T0, "sub_1", "cus_1", "active", "pro");

    // Another worker claimed the event and has not finished.
    let claim = WebhookEventRecord::pending("evt_1", CREATED, json!({}), h.clock_now());
    h.store.claim(claim, h.clock_now()).await.unwrap();

    let err = deliver(&h, &body).await.unwrap_err();
    assert_eq!(err, ReconcileError::InFlight("evt_1".into()));
    assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(h.store.subscription_count_for_billing_id("sub_1").await, 0);

    h.clock.advance_secs(CLAIM_LEASE_SECS + 1);
    let result = deliver(&h, &body).await.unwrap();
    assert_eq!(result, WebhookResult::Processed(ReconcileOutcome::Applied));
    let record = h.store.find_by_event_id("evt_1").await.unwrap().unwrap();
    assert_eq!(record.disposition, EventDisposition::Applied);
}

#[tokio::test]
async fn signed_mode_verifies_deliveries() {
    let secret = "whsec_integration";
    let h = Harness::with_webhook_secret(secret);
    assert!(!h.state.webhooks.is_development_mode());

    let body = event("evt_s", "charge.refunded", T0, json!({}));
    let header = signature_header(secret, T0, &body);

    let ok = h.state.webhooks.receive(&body, Some(&header)).await.unwrap();
    assert_eq!(ok.outcome_name(), "ignored");

    let mut tampered = body.clone();
    tampered.extend_from_slice(b" ");
    let err = h
        .state
        .webhooks
        .receive(&tampered, Some(&header))
        .await
        .unwrap_err();
    assert_eq!(err, ReconcileError::InvalidSignature);
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}
