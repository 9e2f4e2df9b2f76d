//! Plan catalog: the set of purchasable subscription plans.
//!
//! The catalog answers two read-only questions: which plans exist
//! ([`PlanCatalog::list_plans`]) and what a specific plan looks like
//! ([`PlanCatalog::get_plan`]). Two sources are provided:
//!
//! - [`BuiltinPlanCatalog`]: the compiled-in plan set, always available.
//! - [`RemotePlanCatalog`]: plans fetched from a catalog service over HTTPS,
//!   with transient fetch failures retried and surfaced as
//!   [`GateError::CatalogUnavailable`](crate::error::GateError::CatalogUnavailable).
//!
//! An empty catalog is a valid state, not an error: callers receive an empty
//! list and render an empty selection screen.

mod builtin;
mod models;
mod remote;

use std::fmt;

use async_trait::async_trait;

pub use self::builtin::BuiltinPlanCatalog;
pub use self::models::{BillingPeriod, Plan, PlanFeature, PlanId};
pub use self::remote::RemotePlanCatalog;

use crate::error::Result;

/// Read-only source of purchasable plans.
///
/// Implementations must be safe to share across tasks. Lookups are by
/// exact id; a missing plan is `Ok(None)`, while an unreachable backing
/// source is an error.
#[async_trait]
pub trait PlanCatalog: Send + Sync + fmt::Debug {
    /// Returns every plan offered for purchase, in display order.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::CatalogUnavailable`](crate::error::GateError::CatalogUnavailable)
    /// if the backing source cannot be reached.
    async fn list_plans(&self) -> Result<Vec<Plan>>;

    /// Looks up a single plan by id.
    ///
    /// Returns `Ok(None)` when no plan carries the id.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::CatalogUnavailable`](crate::error::GateError::CatalogUnavailable)
    /// if the backing source cannot be reached.
    async fn get_plan(&self, id: &PlanId) -> Result<Option<Plan>>;
}
