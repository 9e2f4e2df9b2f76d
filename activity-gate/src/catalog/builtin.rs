//! Compiled-in plan catalog.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::PlanCatalog;
use super::models::{BillingPeriod, Plan, PlanId};
use crate::error::Result;

/// Plan catalog backed by a fixed, compiled-in plan set.
///
/// The default set offers three monthly tiers (basic, premium, family).
/// All tiers unlock the same content; they differ in price and display
/// features only. Use [`BuiltinPlanCatalog::empty`] for a catalog with no
/// offerings, which is a valid state that renders an empty selection screen.
#[derive(Debug, Clone)]
pub struct BuiltinPlanCatalog {
    plans: Vec<Plan>,
}

impl BuiltinPlanCatalog {
    /// Creates a catalog with the standard three-tier plan set.
    #[must_use]
    pub fn new() -> Self {
        Self { plans: builtin_plans() }
    }

    /// Creates a catalog offering no plans.
    #[must_use]
    pub const fn empty() -> Self {
        Self { plans: Vec::new() }
    }

    /// Creates a catalog from an explicit plan list.
    #[must_use]
    pub fn with_plans(plans: Vec<Plan>) -> Self {
        Self { plans }
    }
}

impl Default for BuiltinPlanCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlanCatalog for BuiltinPlanCatalog {
    async fn list_plans(&self) -> Result<Vec<Plan>> {
        Ok(self.plans.clone())
    }

    async fn get_plan(&self, id: &PlanId) -> Result<Option<Plan>> {
        Ok(self.plans.iter().find(|plan| plan.id == *id).cloned())
    }
}

/// Builds the standard three-tier plan set.
///
/// Panics are unreachable: every id and price below is statically valid.
#[allow(clippy::unwrap_used, reason = "static plan data is known-valid")]
fn builtin_plans() -> Vec<Plan> {
    vec![
        Plan::new(
            PlanId::new("basic").unwrap(),
            "Basic",
            "Full access to the activity library for one child",
            Decimal::new(999, 2),
            BillingPeriod::Monthly,
        )
        .unwrap()
        .with_feature("Unlimited activities", true)
        .with_feature("New activities every week", true)
        .with_feature("Offline downloads", false)
        .with_feature("Family profiles", false),
        Plan::new(
            PlanId::new("premium").unwrap(),
            "Premium",
            "Everything in Basic, plus offline downloads",
            Decimal::new(1999, 2),
            BillingPeriod::Monthly,
        )
        .unwrap()
        .with_feature("Unlimited activities", true)
        .with_feature("New activities every week", true)
        .with_feature("Offline downloads", true)
        .with_feature("Family profiles", false)
        .with_most_popular(),
        Plan::new(
            PlanId::new("family").unwrap(),
            "Family",
            "Everything in Premium, for up to four children",
            Decimal::new(2999, 2),
            BillingPeriod::Monthly,
        )
        .unwrap()
        .with_feature("Unlimited activities", true)
        .with_feature("New activities every week", true)
        .with_feature("Offline downloads", true)
        .with_feature("Family profiles", true),
    ]
}
