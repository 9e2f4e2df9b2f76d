use std::sync::Arc;

use chrono::{Duration, Utc};

use super::{Entitlement, EntitlementEvaluator};
use crate::catalog::{BuiltinPlanCatalog, PlanId};
use crate::session::CurrentUser;
use crate::subscription::{
    MemoryRecordStore, RecordStore, SubscriptionRecord, SubscriptionStatus, SubscriptionStore,
    UserId,
};


fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

fn active_record(user_id: &str, now: chrono::DateTime<Utc>) -> SubscriptionRecord {
    SubscriptionRecord::new(user(user_id), PlanId::new("basic").unwrap(), now)
}

fn evaluator(records: MemoryRecordStore) -> EntitlementEvaluator {
    EntitlementEvaluator::new(SubscriptionStore::new(
        Arc::new(records),
        Arc::new(BuiltinPlanCatalog::new()),
    ))
}

// ============================================================================
// Entitlement::derive Tests
// ============================================================================

#[test]
fn test_no_record_derives_free() {
    assert_eq!(Entitlement::derive(None, Utc::now()), Entitlement::Free);
}

#[test]
fn test_active_record_derives_subscribed() {
    let now = Utc::now();
    let record = active_record("user-1", now);

    let entitlement = Entitlement::derive(Some(&record), now);

    assert_eq!(
        entitlement,
        Entitlement::Subscribed {
            plan_id: PlanId::new("basic").unwrap(),
            expires_at: record.period_end,
        }
    );
}

#[test]
fn test_cancelled_record_derives_free_even_in_window() {
    let now = Utc::now();
    let mut record = active_record("user-1", now);
    record.status = SubscriptionStatus::Cancelled;

    assert_eq!(Entitlement::derive(Some(&record), now), Entitlement::Free);
}

#[test]
fn test_expired_status_derives_free() {
    let now = Utc::now();
    let mut record = active_record("user-1", now);
    record.status = SubscriptionStatus::Expired;

    assert_eq!(Entitlement::derive(Some(&record), now), Entitlement::Free);
}

#[test]
fn test_lapsed_active_record_derives_free() {
    let purchase = Utc::now() - Duration::days(45);
    let record = active_record("user-1", purchase);

    // Status still says active; the lapsed window alone ends access
    assert_eq!(Entitlement::derive(Some(&record), Utc::now()), Entitlement::Free);
}

#[test]
fn test_expiry_boundary_is_exclusive() {
    let now = Utc::now();
    let record = active_record("user-1", now);

    let just_before = Entitlement::derive(Some(&record), record.period_end - Duration::seconds(1));
    assert!(just_before.is_subscribed());

    let at_boundary = Entitlement::derive(Some(&record), record.period_end);
    assert_eq!(at_boundary, Entitlement::Free);

    let after = Entitlement::derive(Some(&record), record.period_end + Duration::seconds(1));
    assert_eq!(after, Entitlement::Free);
}

#[test]
fn test_entitlement_accessors() {
    let now = Utc::now();
    let record = active_record("user-1", now);

    let subscribed = Entitlement::derive(Some(&record), now);
    assert!(subscribed.is_subscribed());
    assert_eq!(subscribed.active_plan_id().map(PlanId::as_str), Some("basic"));
    assert_eq!(subscribed.expires_at(), Some(record.period_end));

    let free = Entitlement::Free;
    assert!(!free.is_subscribed());
    assert!(free.active_plan_id().is_none());
    assert!(free.expires_at().is_none());
}

#[test]
fn test_entitlement_json_shape() {
    let json = serde_json::to_string(&Entitlement::Free).unwrap();
    assert_eq!(json, r#"{"tier":"free"}"#);

    let now = Utc::now();
    let record = active_record("user-1", now);
    let json = serde_json::to_string(&Entitlement::derive(Some(&record), now)).unwrap();
    assert!(json.contains(r#""tier":"subscribed""#));
    assert!(json.contains(r#""plan_id":"basic""#));
}

// ============================================================================
// EntitlementEvaluator Tests
// ============================================================================

#[tokio::test]
async fn test_evaluate_unknown_user_is_free() {
    let eval = evaluator(MemoryRecordStore::new());

    let entitlement = eval.evaluate(&user("stranger"), Utc::now()).await.unwrap();
    assert_eq!(entitlement, Entitlement::Free);
}

#[tokio::test]
async fn test_evaluate_subscriber() {
    let records = MemoryRecordStore::new();
    let now = Utc::now();
    records.insert(&active_record("user-1", now)).await.unwrap();

    let eval = evaluator(records);
    let entitlement = eval.evaluate(&user("user-1"), now).await.unwrap();

    assert!(entitlement.is_subscribed());
}

#[tokio::test]
async fn test_evaluate_is_idempotent_and_read_only() {
    let records = MemoryRecordStore::new();
    let now = Utc::now();
    records.insert(&active_record("user-1", now)).await.unwrap();

    let eval = evaluator(records.clone());

    let first = eval.evaluate(&user("user-1"), now).await.unwrap();
    let second = eval.evaluate(&user("user-1"), now).await.unwrap();
    assert_eq!(first, second);

    // The stored record is untouched by evaluation
    let record = records.fetch(&user("user-1")).await.unwrap().unwrap();
    assert_eq!(record.status, SubscriptionStatus::Active);
    assert_eq!(records.len().await, 1);
}

#[tokio::test]
async fn test_evaluate_viewer_anonymous_is_free() {
    let eval = evaluator(MemoryRecordStore::new());

    let entitlement = eval.evaluate_viewer(&CurrentUser::Anonymous, Utc::now()).await.unwrap();
    assert_eq!(entitlement, Entitlement::Free);
}

#[tokio::test]
async fn test_evaluate_viewer_signed_in_subscriber() {
    let records = MemoryRecordStore::new();
    let now = Utc::now();
    records.insert(&active_record("user-1", now)).await.unwrap();

    let eval = evaluator(records);
    let viewer = CurrentUser::SignedIn(user("user-1"));

    let entitlement = eval.evaluate_viewer(&viewer, now).await.unwrap();
    assert!(entitlement.is_subscribed());
}
