//! Entitlement evaluation: what a viewer can access right now.
//!
//! Entitlement is never stored. It is derived on demand from the
//! subscription record and the current instant, so there is no cached
//! access level to go stale: a lapsed subscription stops granting access
//! at its period end whether or not any bookkeeping has run.

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::catalog::PlanId;
use crate::error::Result;
use crate::session::CurrentUser;
use crate::subscription::{SubscriptionRecord, SubscriptionStore, UserId};

/// A viewer's effective access level at a point in time.
///
/// Exactly two levels exist: `Free` (locked previews only) and
/// `Subscribed` (everything unlocked until `expires_at`). Which paid plan
/// a subscriber holds never changes what they can open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum Entitlement {
    /// Free tier.
    Free,
    /// Paid access under `plan_id` until `expires_at`.
    Subscribed {
        /// The plan granting access.
        plan_id: PlanId,
        /// When access ends. The instant itself is no longer covered.
        expires_at: DateTime<Utc>,
    },
}

impl Entitlement {
    /// Derives the entitlement from a subscription record at `now`.
    ///
    /// Pure and deterministic: the same record and instant always produce
    /// the same answer, and nothing is mutated. No record, a non-active
    /// status, or a lapsed window all resolve to [`Entitlement::Free`].
    ///
    /// # Examples
    ///
    /// ```
    /// use activity_gate::entitlement::Entitlement;
    /// use chrono::Utc;
    ///
    /// let entitlement = Entitlement::derive(None, Utc::now());
    /// assert_eq!(entitlement, Entitlement::Free);
    /// ```
    #[must_use]
    pub fn derive(record: Option<&SubscriptionRecord>, now: DateTime<Utc>) -> Self {
        match record {
            Some(record) if record.is_active_at(now) => Self::Subscribed {
                plan_id: record.plan_id.clone(),
                expires_at: record.period_end,
            },
            _ => Self::Free,
        }
    }

    /// Returns true for paid access.
    #[must_use]
    pub const fn is_subscribed(&self) -> bool {
        matches!(self, Self::Subscribed { .. })
    }

    /// Returns the plan granting access, if any.
    #[must_use]
    pub const fn active_plan_id(&self) -> Option<&PlanId> {
        match self {
            Self::Free => None,
            Self::Subscribed { plan_id, .. } => Some(plan_id),
        }
    }

    /// Returns when paid access ends, if any.
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Free => None,
            Self::Subscribed { expires_at, .. } => Some(*expires_at),
        }
    }
}

/// Evaluates viewer entitlements against the subscription store.
///
/// Evaluation is read-only and idempotent: repeated calls with the same
/// instant return the same answer and never write to the store.
#[derive(Debug, Clone)]
pub struct EntitlementEvaluator {
    store: SubscriptionStore,
}

impl EntitlementEvaluator {
    /// Creates an evaluator over the given store.
    #[must_use]
    pub fn new(store: SubscriptionStore) -> Self {
        Self { store }
    }

    /// Evaluates a user's entitlement at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::PersistenceFailure`](crate::error::GateError::PersistenceFailure)
    /// if the subscription record cannot be fetched. A missing record is
    /// not an error; it is the free tier.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn evaluate(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<Entitlement> {
        let record = self.store.get_subscription(user_id).await?;
        let entitlement = Entitlement::derive(record.as_ref(), now);

        debug!(subscribed = entitlement.is_subscribed(), "Entitlement evaluated");
        Ok(entitlement)
    }

    /// Evaluates a viewer's entitlement at `now`.
    ///
    /// Anonymous viewers resolve to [`Entitlement::Free`] without touching
    /// the store.
    ///
    /// # Errors
    ///
    /// Same as [`EntitlementEvaluator::evaluate`].
    pub async fn evaluate_viewer(
        &self,
        viewer: &CurrentUser,
        now: DateTime<Utc>,
    ) -> Result<Entitlement> {
        match viewer.user_id() {
            Some(user_id) => self.evaluate(user_id, now).await,
            None => Ok(Entitlement::Free),
        }
    }
}
