//! Plan catalog data models.
//!
//! This module defines the purchasable plan shapes: validated plan
//! identifiers, billing cadence, display features, and the plan itself.
//! Everything here is display and selection data; none of it feeds
//! entitlement decisions, which only ever look at the subscription record.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{GateError, Result};

/// Maximum length for plan identifiers.
const MAX_PLAN_ID_LENGTH: usize = 64;

/// Validated plan identifier.
///
/// Plan ids are stable, unique across the catalog, and restricted to
/// alphanumeric characters, hyphens, and underscores (1-64 characters).
///
/// # Examples
///
/// ```
/// use activity_gate::catalog::PlanId;
///
/// let id = PlanId::new("basic").unwrap();
/// assert_eq!(id.as_str(), "basic");
///
/// assert!(PlanId::new("").is_err());
/// assert!(PlanId::new("plan with spaces").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(String);

impl PlanId {
    /// Creates a new plan id after validation.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidPlan`] if the id is empty, longer than 64
    /// characters, or contains characters other than alphanumerics, hyphens,
    /// and underscores.
    pub fn new<S: Into<String>>(id: S) -> Result<Self> {
        let id = id.into();

        if id.is_empty() {
            return Err(GateError::InvalidPlan("plan id cannot be empty".to_owned()));
        }

        if id.len() > MAX_PLAN_ID_LENGTH {
            return Err(GateError::InvalidPlan(format!(
                "plan id cannot exceed {MAX_PLAN_ID_LENGTH} characters"
            )));
        }

        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(GateError::InvalidPlan(format!(
                "plan id contains invalid characters: {id}"
            )));
        }

        Ok(Self(id))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PlanId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Billing cadence for a plan.
///
/// Display label only; grant length is fixed regardless of cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingPeriod {
    /// Billed every month.
    Monthly,
    /// Billed every year.
    Yearly,
}

impl BillingPeriod {
    /// Returns the cadence as a display label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single display feature of a plan.
///
/// The ordered feature list is rendered on plan selection cards; whether a
/// feature is `included` never affects which content a subscriber can open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFeature {
    /// Feature display name.
    pub name: String,
    /// Whether this plan includes the feature.
    pub included: bool,
}

fn default_currency() -> String {
    "USD".to_owned()
}

/// A purchasable subscription plan.
///
/// Plans carry display and pricing data for selection cards. All plans
/// unlock the same content; they differ only in price and feature display.
///
/// # Examples
///
/// ```
/// use activity_gate::catalog::{BillingPeriod, Plan, PlanId};
/// use rust_decimal::Decimal;
///
/// let plan = Plan::new(
///     PlanId::new("basic").unwrap(),
///     "Basic",
///     "Access to all activities",
///     Decimal::new(999, 2),
///     BillingPeriod::Monthly,
/// )
/// .unwrap()
/// .with_feature("Unlimited activities", true)
/// .with_feature("Offline downloads", false);
///
/// assert_eq!(plan.id.as_str(), "basic");
/// assert_eq!(plan.features.len(), 2);
/// assert!(!plan.most_popular);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Stable unique identifier.
    pub id: PlanId,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Non-negative monetary amount per billing period.
    pub price: Decimal,
    /// ISO 4217 currency code (default: USD).
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Billing cadence label.
    pub period: BillingPeriod,
    /// Ordered display features.
    #[serde(default)]
    pub features: Vec<PlanFeature>,
    /// Display hint for the recommended plan card.
    #[serde(default)]
    pub most_popular: bool,
}

impl Plan {
    /// Creates a new plan after validating the price.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidPlan`] if `price` is negative.
    pub fn new<N, D>(
        id: PlanId,
        name: N,
        description: D,
        price: Decimal,
        period: BillingPeriod,
    ) -> Result<Self>
    where
        N: Into<String>,
        D: Into<String>,
    {
        if price < Decimal::ZERO {
            return Err(GateError::InvalidPlan(format!(
                "plan '{id}' has a negative price: {price}"
            )));
        }

        Ok(Self {
            id,
            name: name.into(),
            description: description.into(),
            price,
            currency: default_currency(),
            period,
            features: Vec::new(),
            most_popular: false,
        })
    }

    /// Appends a display feature, preserving insertion order.
    #[must_use]
    pub fn with_feature<N: Into<String>>(mut self, name: N, included: bool) -> Self {
        self.features.push(PlanFeature { name: name.into(), included });
        self
    }

    /// Marks this plan as the recommended ("most popular") card.
    #[must_use]
    pub fn with_most_popular(mut self) -> Self {
        self.most_popular = true;
        self
    }

    /// Returns true if the plan data is internally consistent.
    ///
    /// Used to sanitize remotely fetched plan entries, which are not trusted
    /// blindly: a negative price or malformed id disqualifies the entry.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.price >= Decimal::ZERO && PlanId::new(self.id.as_str()).is_ok()
    }
}
