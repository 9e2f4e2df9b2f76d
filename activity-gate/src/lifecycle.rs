//! Subscription lifecycle orchestration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::catalog::{PlanCatalog, PlanId};
use crate::error::{GateError, Result};
use crate::session::CurrentUser;
use crate::subscription::{SubscriptionRecord, SubscriptionStore};

/// Orchestrates plan selection into a persisted subscription.
///
/// The controller owns the ordering guarantees of the purchase flow:
/// a missing sign-in fails before any collaborator is contacted, the plan
/// id from the client is validated against the catalog before anything is
/// written, and success is only reported once the record is durably
/// persisted. There is no optimistic success path.
#[derive(Debug, Clone)]
pub struct SubscriptionController {
    plans: Arc<dyn PlanCatalog>,
    store: SubscriptionStore,
}

impl SubscriptionController {
    /// Creates a controller over the given catalog and store.
    #[must_use]
    pub fn new(plans: Arc<dyn PlanCatalog>, store: SubscriptionStore) -> Self {
        Self { plans, store }
    }

    /// Subscribes the viewer to `plan_id`, granting thirty days of access
    /// from `now`.
    ///
    /// `plan_id` is client input and is never trusted blindly: it must
    /// parse as a plan id and must exist in the catalog before the store
    /// is asked to persist anything. A returned record is already durable.
    ///
    /// # Errors
    ///
    /// - [`GateError::Unauthenticated`] if no one is signed in; returned
    ///   before any catalog or store contact.
    /// - [`GateError::InvalidPlan`] if the plan id is malformed or missing
    ///   from the catalog.
    /// - [`GateError::AlreadySubscribed`] if the viewer already holds an
    ///   active subscription.
    /// - [`GateError::CatalogUnavailable`] /
    ///   [`GateError::PersistenceFailure`] for backend failures; neither
    ///   leaves a partial record behind.
    #[instrument(skip(self, viewer), fields(plan_id = plan_id, signed_in = viewer.is_signed_in()))]
    pub async fn subscribe(
        &self,
        viewer: &CurrentUser,
        plan_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SubscriptionRecord> {
        let Some(user_id) = viewer.user_id() else {
            return Err(GateError::Unauthenticated);
        };

        let plan_id = PlanId::new(plan_id)?;

        let Some(plan) = self.plans.get_plan(&plan_id).await? else {
            // A selection screen offering a plan the catalog no longer has
            warn!("Plan selection references a plan missing from the catalog");
            return Err(GateError::InvalidPlan(plan_id.to_string()));
        };

        let record = self.store.create_subscription(user_id, &plan_id, now).await?;

        info!(
            user_id = %record.user_id,
            plan = %plan.name,
            period_end = %record.period_end,
            "Subscription created"
        );
        Ok(record)
    }

    /// Cancels the viewer's active subscription.
    ///
    /// # Errors
    ///
    /// - [`GateError::Unauthenticated`] if no one is signed in.
    /// - [`GateError::NotSubscribed`] if the viewer has no active
    ///   subscription to cancel.
    /// - [`GateError::PersistenceFailure`] if the store fails.
    #[instrument(skip(self, viewer), fields(signed_in = viewer.is_signed_in()))]
    pub async fn cancel(
        &self,
        viewer: &CurrentUser,
        now: DateTime<Utc>,
    ) -> Result<SubscriptionRecord> {
        let Some(user_id) = viewer.user_id() else {
            return Err(GateError::Unauthenticated);
        };

        self.store.cancel_subscription(user_id, now).await
    }
}
