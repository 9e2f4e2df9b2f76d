//! Subscription store: validated record creation and lifecycle updates.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use super::models::{SubscriptionRecord, SubscriptionStatus, UserId};
use super::persistence::RecordStore;
use crate::catalog::{PlanCatalog, PlanId};
use crate::error::{GateError, Result};

/// Subscription store combining durable records with plan validation.
///
/// Every creation validates the plan against the catalog before anything is
/// written, so a failed request leaves no partial record behind. Reads pass
/// straight through to the backing [`RecordStore`].
#[derive(Debug, Clone)]
pub struct SubscriptionStore {
    records: Arc<dyn RecordStore>,
    plans: Arc<dyn PlanCatalog>,
}

impl SubscriptionStore {
    /// Creates a store over the given record backend and plan catalog.
    #[must_use]
    pub fn new(records: Arc<dyn RecordStore>, plans: Arc<dyn PlanCatalog>) -> Self {
        Self { records, plans }
    }

    /// Looks up a user's subscription record.
    ///
    /// Returns `Ok(None)` when the user has never subscribed.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::PersistenceFailure`] if the record backend
    /// cannot be reached.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_subscription(&self, user_id: &UserId) -> Result<Option<SubscriptionRecord>> {
        self.records.fetch(user_id).await
    }

    /// Creates an active subscription for `user_id` on `plan_id`.
    ///
    /// The access window runs from `now` for exactly thirty days. Creation
    /// is all-or-nothing: plan validation and the duplicate check both
    /// happen before the insert, and the insert itself re-checks for an
    /// active record, so a rejected request writes nothing.
    ///
    /// # Errors
    ///
    /// - [`GateError::InvalidPlan`] if the catalog has no such plan.
    /// - [`GateError::AlreadySubscribed`] if an active, unexpired record
    ///   exists for the user.
    /// - [`GateError::CatalogUnavailable`] if the plan cannot be verified.
    /// - [`GateError::PersistenceFailure`] if the record backend fails.
    #[instrument(skip(self), fields(user_id = %user_id, plan_id = %plan_id))]
    pub async fn create_subscription(
        &self,
        user_id: &UserId,
        plan_id: &PlanId,
        now: DateTime<Utc>,
    ) -> Result<SubscriptionRecord> {
        if self.plans.get_plan(plan_id).await?.is_none() {
            warn!("Rejected subscription to unknown plan");
            return Err(GateError::InvalidPlan(plan_id.to_string()));
        }

        // Friendly pre-check; the insert below re-checks under its own
        // lock and remains the authoritative guard against duplicates.
        if let Some(existing) = self.records.fetch(user_id).await?
            && existing.is_active_at(now)
        {
            return Err(GateError::AlreadySubscribed);
        }

        let record = SubscriptionRecord::new(user_id.clone(), plan_id.clone(), now);
        self.records.insert(&record).await?;

        info!(period_end = %record.period_end, "Subscription persisted");
        Ok(record)
    }

    /// Cancels the user's active subscription in place.
    ///
    /// The record stays in the store with status `cancelled`; access ends
    /// immediately and a later purchase replaces the record.
    ///
    /// # Errors
    ///
    /// - [`GateError::NotSubscribed`] if the user has no active, unexpired
    ///   record to cancel.
    /// - [`GateError::PersistenceFailure`] if the record backend fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn cancel_subscription(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<SubscriptionRecord> {
        match self.records.fetch(user_id).await? {
            Some(record) if record.is_active_at(now) => {
                let updated = self
                    .records
                    .update_status(user_id, SubscriptionStatus::Cancelled)
                    .await?
                    .ok_or(GateError::NotSubscribed)?;

                info!("Subscription cancelled");
                Ok(updated)
            }
            _ => Err(GateError::NotSubscribed),
        }
    }

    /// Marks lapsed active records as expired.
    ///
    /// Bookkeeping only: entitlement evaluation already treats lapsed
    /// records as free tier whether or not the sweep has run.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::PersistenceFailure`] if the record backend
    /// fails.
    #[instrument(skip(self))]
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let flipped = self.records.sweep_expired(now).await?;
        if flipped > 0 {
            info!(flipped, "Marked lapsed subscriptions as expired");
        }
        Ok(flipped)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Duration;

    use super::*;
    use crate::catalog::BuiltinPlanCatalog;
    use crate::subscription::MemoryRecordStore;

    /// Catalog stub whose backing service is unreachable.
    #[derive(Debug)]
    struct DownCatalog;

    #[async_trait]
    impl PlanCatalog for DownCatalog {
        async fn list_plans(&self) -> Result<Vec<crate::catalog::Plan>> {
            Err(GateError::CatalogUnavailable("connection refused".to_owned()))
        }

        async fn get_plan(&self, _id: &PlanId) -> Result<Option<crate::catalog::Plan>> {
            Err(GateError::CatalogUnavailable("connection refused".to_owned()))
        }
    }

    fn store_with(records: MemoryRecordStore) -> SubscriptionStore {
        SubscriptionStore::new(Arc::new(records), Arc::new(BuiltinPlanCatalog::new()))
    }

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn plan(id: &str) -> PlanId {
        PlanId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_create_persists_active_record() {
        let store = store_with(MemoryRecordStore::new());
        let now = Utc::now();

        let record = store.create_subscription(&user("user-1"), &plan("basic"), now).await.unwrap();

        assert_eq!(record.status, SubscriptionStatus::Active);
        assert_eq!(record.created_at, now);
        assert_eq!(record.period_end, now + Duration::days(30));

        let stored = store.get_subscription(&user("user-1")).await.unwrap();
        assert_eq!(stored, Some(record));
    }

    #[tokio::test]
    async fn test_create_unknown_plan_writes_nothing() {
        let records = MemoryRecordStore::new();
        let store = store_with(records.clone());

        let result =
            store.create_subscription(&user("user-1"), &plan("no-such-plan"), Utc::now()).await;

        assert!(matches!(result, Err(GateError::InvalidPlan(_))));
        assert!(records.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_duplicate_active_rejected() {
        let store = store_with(MemoryRecordStore::new());
        let now = Utc::now();

        store.create_subscription(&user("user-1"), &plan("basic"), now).await.unwrap();

        let result = store
            .create_subscription(&user("user-1"), &plan("premium"), now + Duration::days(1))
            .await;
        assert!(matches!(result, Err(GateError::AlreadySubscribed)));

        // Original plan survives the rejected upgrade attempt
        let stored = store.get_subscription(&user("user-1")).await.unwrap().unwrap();
        assert_eq!(stored.plan_id.as_str(), "basic");
    }

    #[tokio::test]
    async fn test_create_after_cancel_replaces_record() {
        let store = store_with(MemoryRecordStore::new());
        let now = Utc::now();

        store.create_subscription(&user("user-1"), &plan("basic"), now).await.unwrap();
        store.cancel_subscription(&user("user-1"), now).await.unwrap();

        let renewed = store
            .create_subscription(&user("user-1"), &plan("premium"), now + Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(renewed.plan_id.as_str(), "premium");
        assert_eq!(renewed.status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn test_create_after_lapse_replaces_record() {
        let store = store_with(MemoryRecordStore::new());
        let long_ago = Utc::now() - Duration::days(90);

        store.create_subscription(&user("user-1"), &plan("basic"), long_ago).await.unwrap();

        let renewed =
            store.create_subscription(&user("user-1"), &plan("basic"), Utc::now()).await.unwrap();
        assert!(renewed.is_active_at(Utc::now()));
    }

    #[tokio::test]
    async fn test_create_with_unreachable_catalog_writes_nothing() {
        let records = MemoryRecordStore::new();
        let store = SubscriptionStore::new(Arc::new(records.clone()), Arc::new(DownCatalog));

        let result = store.create_subscription(&user("user-1"), &plan("basic"), Utc::now()).await;

        assert!(matches!(result, Err(GateError::CatalogUnavailable(_))));
        assert!(records.is_empty().await);
    }

    #[tokio::test]
    async fn test_cancel_active_subscription() {
        let store = store_with(MemoryRecordStore::new());
        let now = Utc::now();
        store.create_subscription(&user("user-1"), &plan("basic"), now).await.unwrap();

        let cancelled = store.cancel_subscription(&user("user-1"), now).await.unwrap();
        assert_eq!(cancelled.status, SubscriptionStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_without_record_is_not_subscribed() {
        let store = store_with(MemoryRecordStore::new());

        let result = store.cancel_subscription(&user("nobody"), Utc::now()).await;
        assert!(matches!(result, Err(GateError::NotSubscribed)));
    }

    #[tokio::test]
    async fn test_cancel_lapsed_record_is_not_subscribed() {
        let store = store_with(MemoryRecordStore::new());
        let long_ago = Utc::now() - Duration::days(90);
        store.create_subscription(&user("user-1"), &plan("basic"), long_ago).await.unwrap();

        let result = store.cancel_subscription(&user("user-1"), Utc::now()).await;
        assert!(matches!(result, Err(GateError::NotSubscribed)));
    }

    #[tokio::test]
    async fn test_cancel_twice_is_not_subscribed() {
        let store = store_with(MemoryRecordStore::new());
        let now = Utc::now();
        store.create_subscription(&user("user-1"), &plan("basic"), now).await.unwrap();
        store.cancel_subscription(&user("user-1"), now).await.unwrap();

        let result = store.cancel_subscription(&user("user-1"), now).await;
        assert!(matches!(result, Err(GateError::NotSubscribed)));
    }

    #[tokio::test]
    async fn test_sweep_delegates_to_backend() {
        let store = store_with(MemoryRecordStore::new());
        let long_ago = Utc::now() - Duration::days(90);
        store.create_subscription(&user("user-1"), &plan("basic"), long_ago).await.unwrap();

        let flipped = store.sweep_expired(Utc::now()).await.unwrap();
        assert_eq!(flipped, 1);

        let record = store.get_subscription(&user("user-1")).await.unwrap().unwrap();
        assert_eq!(record.status, SubscriptionStatus::Expired);
    }
}
