//! Subscription record data models.
//!
//! A subscription record is the single source of truth for what a user has
//! purchased. Entitlement decisions read these fields and nothing else.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::PlanId;
use crate::error::{GateError, Result};

/// Maximum length for user identifiers.
const MAX_USER_ID_LENGTH: usize = 64;

/// Number of days of access granted by a subscription purchase.
///
/// Every purchase grants exactly this window from the moment of creation;
/// renewal and proration are out of scope for the gate.
pub const GRANT_PERIOD_DAYS: i64 = 30;

/// Validated user identifier.
///
/// User ids key subscription records and are restricted to alphanumeric
/// characters, hyphens, and underscores (1-64 characters).
///
/// # Examples
///
/// ```
/// use activity_gate::subscription::UserId;
///
/// let id = UserId::new("user-123").unwrap();
/// assert_eq!(id.as_str(), "user-123");
///
/// assert!(UserId::new("").is_err());
/// assert!(UserId::new("user@example.com").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new user id after validation.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidUserId`] if the id is empty, longer than
    /// 64 characters, or contains characters other than alphanumerics,
    /// hyphens, and underscores.
    pub fn new<S: Into<String>>(id: S) -> Result<Self> {
        let id = id.into();

        if id.is_empty() {
            return Err(GateError::InvalidUserId("user id cannot be empty".to_owned()));
        }

        if id.len() > MAX_USER_ID_LENGTH {
            return Err(GateError::InvalidUserId(format!(
                "user id cannot exceed {MAX_USER_ID_LENGTH} characters"
            )));
        }

        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(GateError::InvalidUserId(format!(
                "user id contains invalid characters: {id}"
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

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lifecycle state of a subscription record.
///
/// Only `Active` can grant access, and even then only until the record's
/// period end. `Cancelled` and `Expired` records are kept for history and
/// never block a new purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid and within its access window.
    Active,
    /// Cancelled by the user before the window ended.
    Cancelled,
    /// Lapsed past its period end.
    Expired,
}

impl SubscriptionStatus {
    /// Returns the status as its wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user's subscription record.
///
/// At most one record exists per user. The record is created with a fixed
/// 30-day access window ([`GRANT_PERIOD_DAYS`]) and its status is updated
/// in place on cancellation or expiry sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// Owner of the record.
    pub user_id: UserId,
    /// The plan purchased.
    pub plan_id: PlanId,
    /// Current lifecycle state.
    pub status: SubscriptionStatus,
    /// End of the paid access window. Access stops at this instant.
    pub period_end: DateTime<Utc>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl SubscriptionRecord {
    /// Creates a fresh active record for a purchase made at `now`.
    ///
    /// The access window always ends exactly [`GRANT_PERIOD_DAYS`] days
    /// after creation, so `period_end > created_at` holds by construction.
    #[must_use]
    pub fn new(user_id: UserId, plan_id: PlanId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            plan_id,
            status: SubscriptionStatus::Active,
            period_end: now + Duration::days(GRANT_PERIOD_DAYS),
            created_at: now,
        }
    }

    /// Returns true if this record grants access at `now`.
    ///
    /// A record grants access only while its status is `Active` and `now`
    /// is strictly before `period_end`: at exactly `period_end` the grant
    /// has already ended.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && now < self.period_end
    }
}
