//! Content gating: annotating the catalog and guarding activity launch.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::activities::{Activity, ActivityDirectory};
use crate::entitlement::{Entitlement, EntitlementEvaluator};
use crate::error::{GateError, Result};
use crate::session::CurrentUser;
use crate::signal::RouteSignal;

/// An activity annotated with whether the viewer may open it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatedActivity {
    /// The activity metadata, always visible.
    pub activity: Activity,
    /// Whether the viewer may open the full view.
    pub accessible: bool,
}

/// Annotates a catalog listing with per-item accessibility.
///
/// Accessibility is catalog-wide and binary: a subscriber opens
/// everything, everyone else opens nothing. Items keep their order, and a
/// listing never mixes accessible and locked entries.
#[must_use]
pub fn gate_catalog(items: Vec<Activity>, entitlement: &Entitlement) -> Vec<GatedActivity> {
    let accessible = entitlement.is_subscribed();
    items.into_iter().map(|activity| GatedActivity { activity, accessible }).collect()
}

/// Outcome of attempting to open an activity's full view.
#[must_use = "a denied launch must be routed, not ignored"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Full content unlocked.
    Granted(Activity),
    /// Launch refused at the gate.
    Denied {
        /// The activity, for rendering its locked preview.
        activity: Activity,
        /// Where to send the viewer instead.
        signal: RouteSignal,
    },
}

impl LaunchOutcome {
    /// Returns true if full content was unlocked.
    #[must_use]
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

/// The authority on what the current viewer may open.
///
/// Screens render what the gate hands them; hiding a locked card in the
/// UI is presentation, not protection. Every launch goes through
/// [`ContentGate::open`], which re-evaluates entitlement at that instant.
#[derive(Debug, Clone)]
pub struct ContentGate {
    directory: Arc<dyn ActivityDirectory>,
    evaluator: EntitlementEvaluator,
}

impl ContentGate {
    /// Creates a gate over the given directory and evaluator.
    #[must_use]
    pub fn new(directory: Arc<dyn ActivityDirectory>, evaluator: EntitlementEvaluator) -> Self {
        Self { directory, evaluator }
    }

    /// Returns the full catalog annotated for the viewer at `now`.
    ///
    /// Anonymous viewers and free-tier users browse the same listing with
    /// every entry locked; metadata is never withheld.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::PersistenceFailure`](crate::error::GateError::PersistenceFailure)
    /// if entitlement cannot be evaluated, or the directory's error if the
    /// listing cannot be fetched.
    #[instrument(skip(self, viewer), fields(signed_in = viewer.is_signed_in()))]
    pub async fn browse(
        &self,
        viewer: &CurrentUser,
        now: DateTime<Utc>,
    ) -> Result<Vec<GatedActivity>> {
        let entitlement = self.evaluator.evaluate_viewer(viewer, now).await?;
        let items = self.directory.list_activities().await?;

        debug!(items = items.len(), subscribed = entitlement.is_subscribed(), "Catalog gated");
        Ok(gate_catalog(items, &entitlement))
    }

    /// Returns matching activities annotated for the viewer at `now`.
    ///
    /// # Errors
    ///
    /// Same as [`ContentGate::browse`].
    #[instrument(skip(self, viewer), fields(signed_in = viewer.is_signed_in(), %query))]
    pub async fn search(
        &self,
        viewer: &CurrentUser,
        query: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<GatedActivity>> {
        let entitlement = self.evaluator.evaluate_viewer(viewer, now).await?;
        let items = self.directory.search_activities(query).await?;

        Ok(gate_catalog(items, &entitlement))
    }

    /// Guards navigation into an activity's full view.
    ///
    /// Entitlement is re-evaluated at the moment of launch, so a
    /// subscription that lapsed since the catalog was rendered is caught
    /// here. A refused launch carries
    /// [`RouteSignal::RedirectToSubscribe`] and the activity itself, so
    /// the caller can show the locked preview alongside the prompt.
    ///
    /// # Errors
    ///
    /// - [`GateError::ActivityNotFound`] if no activity carries the id.
    /// - [`GateError::PersistenceFailure`](crate::error::GateError::PersistenceFailure)
    ///   if entitlement cannot be evaluated.
    #[instrument(skip(self, viewer), fields(signed_in = viewer.is_signed_in(), %activity_id))]
    pub async fn open(
        &self,
        viewer: &CurrentUser,
        activity_id: &str,
        now: DateTime<Utc>,
    ) -> Result<LaunchOutcome> {
        let Some(activity) = self.directory.get_activity(activity_id).await? else {
            return Err(GateError::ActivityNotFound(activity_id.to_owned()));
        };

        let entitlement = self.evaluator.evaluate_viewer(viewer, now).await?;

        if entitlement.is_subscribed() {
            Ok(LaunchOutcome::Granted(activity))
        } else {
            debug!("Launch refused; routing viewer to subscribe");
            Ok(LaunchOutcome::Denied { activity, signal: RouteSignal::RedirectToSubscribe })
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::activities::StaticActivityDirectory;
    use crate::catalog::{BuiltinPlanCatalog, PlanId};
    use crate::subscription::{
        MemoryRecordStore, RecordStore, SubscriptionRecord, SubscriptionStore, UserId,
    };

    fn directory() -> Arc<dyn ActivityDirectory> {
        Arc::new(StaticActivityDirectory::new(vec![
            Activity::new("volcano-1", "Baking Soda Volcano").with_category("Science"),
            Activity::new("paper-crane", "Origami Paper Crane").with_category("Crafts"),
            Activity::new("star-map", "Backyard Star Map").with_category("Science"),
        ]))
    }

    fn gate_over(records: MemoryRecordStore) -> ContentGate {
        let store =
            SubscriptionStore::new(Arc::new(records), Arc::new(BuiltinPlanCatalog::new()));
        ContentGate::new(directory(), EntitlementEvaluator::new(store))
    }

    fn viewer(id: &str) -> CurrentUser {
        CurrentUser::SignedIn(UserId::new(id).unwrap())
    }

    async fn subscribe(records: &MemoryRecordStore, user: &str, now: chrono::DateTime<Utc>) {
        let record = SubscriptionRecord::new(
            UserId::new(user).unwrap(),
            PlanId::new("basic").unwrap(),
            now,
        );
        records.insert(&record).await.unwrap();
    }

    // ========================================================================
    // gate_catalog Tests
    // ========================================================================

    #[test]
    fn test_gate_catalog_free_locks_everything() {
        let items = vec![Activity::new("a", "A"), Activity::new("b", "B")];

        let gated = gate_catalog(items, &Entitlement::Free);

        assert_eq!(gated.len(), 2);
        assert!(gated.iter().all(|g| !g.accessible));
    }

    #[test]
    fn test_gate_catalog_subscriber_unlocks_everything() {
        let items = vec![Activity::new("a", "A"), Activity::new("b", "B")];
        let entitlement = Entitlement::Subscribed {
            plan_id: PlanId::new("basic").unwrap(),
            expires_at: Utc::now() + Duration::days(1),
        };

        let gated = gate_catalog(items, &entitlement);

        assert!(gated.iter().all(|g| g.accessible));
    }

    #[test]
    fn test_gate_catalog_preserves_order_and_handles_empty() {
        let items = vec![Activity::new("z", "Z"), Activity::new("a", "A")];

        let gated = gate_catalog(items, &Entitlement::Free);
        let ids: Vec<&str> = gated.iter().map(|g| g.activity.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a"]);

        assert!(gate_catalog(Vec::new(), &Entitlement::Free).is_empty());
    }

    // ========================================================================
    // ContentGate Tests
    // ========================================================================

    #[tokio::test]
    async fn test_browse_without_record_locks_all_items() {
        let gate = gate_over(MemoryRecordStore::new());

        let gated = gate.browse(&viewer("parent-1"), Utc::now()).await.unwrap();

        assert_eq!(gated.len(), 3);
        assert!(gated.iter().all(|g| !g.accessible));
    }

    #[tokio::test]
    async fn test_browse_anonymous_locks_all_items() {
        let gate = gate_over(MemoryRecordStore::new());

        let gated = gate.browse(&CurrentUser::Anonymous, Utc::now()).await.unwrap();
        assert!(gated.iter().all(|g| !g.accessible));
    }

    #[tokio::test]
    async fn test_browse_as_subscriber_unlocks_all_items() {
        let records = MemoryRecordStore::new();
        let now = Utc::now();
        subscribe(&records, "parent-1", now).await;

        let gate = gate_over(records);
        let gated = gate.browse(&viewer("parent-1"), now).await.unwrap();

        assert_eq!(gated.len(), 3);
        assert!(gated.iter().all(|g| g.accessible));
    }

    #[tokio::test]
    async fn test_search_results_are_gated() {
        let records = MemoryRecordStore::new();
        let now = Utc::now();
        subscribe(&records, "parent-1", now).await;

        let gate = gate_over(records);
        let gated = gate.search(&viewer("parent-1"), "star", now).await.unwrap();

        assert_eq!(gated.len(), 1);
        assert_eq!(gated[0].activity.id, "star-map");
        assert!(gated[0].accessible);
    }

    #[tokio::test]
    async fn test_open_as_subscriber_is_granted() {
        let records = MemoryRecordStore::new();
        let now = Utc::now();
        subscribe(&records, "parent-1", now).await;

        let gate = gate_over(records);
        let outcome = gate.open(&viewer("parent-1"), "volcano-1", now).await.unwrap();

        let LaunchOutcome::Granted(activity) = outcome else {
            unreachable!("subscriber launch should be granted");
        };
        assert_eq!(activity.id, "volcano-1");
    }

    #[tokio::test]
    async fn test_open_without_subscription_redirects_to_subscribe() {
        let gate = gate_over(MemoryRecordStore::new());

        let outcome = gate.open(&viewer("parent-1"), "volcano-1", Utc::now()).await.unwrap();

        let LaunchOutcome::Denied { activity, signal } = outcome else {
            unreachable!("free-tier launch should be denied");
        };
        assert_eq!(activity.id, "volcano-1");
        assert_eq!(signal, RouteSignal::RedirectToSubscribe);
    }

    #[tokio::test]
    async fn test_open_after_lapse_is_denied() {
        let records = MemoryRecordStore::new();
        let purchase = Utc::now() - Duration::days(45);
        subscribe(&records, "parent-1", purchase).await;

        let gate = gate_over(records);
        let outcome = gate.open(&viewer("parent-1"), "volcano-1", Utc::now()).await.unwrap();

        assert!(!outcome.is_granted());
    }

    #[tokio::test]
    async fn test_open_unknown_activity() {
        let gate = gate_over(MemoryRecordStore::new());

        let result = gate.open(&viewer("parent-1"), "no-such-activity", Utc::now()).await;
        assert!(matches!(result, Err(GateError::ActivityNotFound(_))));
    }
}
