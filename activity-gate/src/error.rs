//! Error types for subscription and entitlement gating.
//!
//! This module defines all error types that can occur during gating operations.
//! All errors implement the standard [`std::error::Error`] trait via [`thiserror::Error`].
//!
//! # Error Categories
//!
//! - **Access Errors** ([`GateError::Unauthenticated`], [`GateError::NotSubscribed`]):
//!   The caller lacks a session or an active grant; resolved by routing, not by retrying
//! - **Validation Errors** ([`GateError::InvalidPlan`], [`GateError::InvalidUserId`]):
//!   Input failed validation or referenced something the catalog does not know
//! - **Collaborator Errors** ([`GateError::PersistenceFailure`],
//!   [`GateError::CatalogUnavailable`]): An external store or catalog call failed
//! - **Policy Errors** ([`GateError::AlreadySubscribed`]): The operation conflicts with
//!   an existing grant
//!
//! # Examples
//!
//! ```
//! use activity_gate::error::{GateError, Result};
//!
//! fn require_plan_name(name: &str) -> Result<&str> {
//!     if name.is_empty() {
//!         return Err(GateError::InvalidPlan("plan id cannot be empty".to_owned()));
//!     }
//!     Ok(name)
//! }
//!
//! assert!(require_plan_name("").is_err());
//! assert!(require_plan_name("basic").is_ok());
//! ```

use thiserror::Error;

/// Result type alias for gating operations.
///
/// This is a convenience type that uses [`GateError`] as the error type.
/// All fallible functions in this crate return this type.
pub type Result<T> = std::result::Result<T, GateError>;

/// Errors that can occur during subscription and entitlement gating.
///
/// Every variant is a typed outcome a presentation layer can translate into
/// user-visible text; none of them is raised as a panic across component
/// boundaries. The messages are designed to be user-facing and actionable.
///
/// # Error Recovery
///
/// - **Access errors** ([`Unauthenticated`](Self::Unauthenticated)): Redirect to login
/// - **Validation errors** ([`InvalidPlan`](Self::InvalidPlan)): Re-show plan selection
/// - **Transient errors** ([`PersistenceFailure`](Self::PersistenceFailure),
///   [`CatalogUnavailable`](Self::CatalogUnavailable)): Retry at user discretion
/// - **Policy conflicts** ([`AlreadySubscribed`](Self::AlreadySubscribed)): Informational,
///   not an error banner
///
/// This type implements `#[must_use]` to ensure errors are not silently ignored.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum GateError {
    /// No current user.
    ///
    /// Returned by lifecycle operations invoked without a signed-in user. The
    /// subscription store is never contacted in this case.
    ///
    /// # Recovery
    ///
    /// Redirect to the login flow; never treat as a hard fault.
    #[error("not signed in")]
    Unauthenticated,

    /// Invalid user identifier.
    ///
    /// User ids must meet these requirements:
    /// - Not empty
    /// - Maximum 64 characters
    /// - Only alphanumeric characters, hyphens, and underscores
    ///
    /// # Recovery
    ///
    /// Fix the identifier at the session boundary; a well-formed session never
    /// produces this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use activity_gate::error::GateError;
    ///
    /// let err = GateError::InvalidUserId("user id cannot be empty".to_owned());
    /// assert!(err.to_string().contains("invalid user id"));
    /// ```
    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    /// Requested plan is malformed or not present in the plan catalog.
    ///
    /// A well-behaved client only offers plan ids it just listed, so this
    /// error indicates a client/catalog desync and is logged at warn level
    /// where it is detected.
    ///
    /// # Recovery
    ///
    /// Re-show plan selection from a fresh catalog listing.
    ///
    /// # Examples
    ///
    /// ```
    /// use activity_gate::error::GateError;
    ///
    /// let err = GateError::InvalidPlan("no plan named 'gold' in the catalog".to_owned());
    /// assert_eq!(err.to_string(), "invalid plan: no plan named 'gold' in the catalog");
    /// ```
    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    /// An active, unexpired subscription already exists for this user.
    ///
    /// Creation is rejected rather than overwriting the existing grant. A
    /// cancelled or lapsed record does not trigger this error.
    ///
    /// # Recovery
    ///
    /// Surface as an informational message, not an error banner; the user
    /// already has what they were trying to buy.
    #[error("an active subscription already exists for this account")]
    AlreadySubscribed,

    /// No subscription record exists for an operation that needs one.
    ///
    /// Returned by cancellation when the user has nothing to cancel.
    ///
    /// # Recovery
    ///
    /// Route to plan selection.
    #[error("no subscription exists for this account")]
    NotSubscribed,

    /// A subscription store read or write failed.
    ///
    /// Wraps transport-level failures (network, timeout, auth rejection,
    /// constraint violation) from the persistence collaborator. The raw
    /// transport error is flattened into the message; callers only see this
    /// classification.
    ///
    /// # Recovery
    ///
    /// Retry at user discretion. Must never be presented as if the write
    /// succeeded: a swallowed failure desynchronizes displayed entitlement
    /// from billing truth.
    #[error("subscription store request failed: {0}")]
    PersistenceFailure(String),

    /// The plan catalog failed to load.
    ///
    /// # Recovery
    ///
    /// Retry the fetch. Browsing of locked previews keeps working in the
    /// meantime; gating does not depend on the plan catalog.
    #[error("plan catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// No activity with the requested id exists in the directory.
    ///
    /// # Recovery
    ///
    /// Route back to the catalog listing; the item may have been removed
    /// since the listing was rendered.
    #[error("activity not found: {0}")]
    ActivityNotFound(String),

    /// The gate configuration file is invalid.
    ///
    /// Covers TOML parse failures and security validation failures (non-HTTPS
    /// base URLs, loopback hosts, malformed environment variable names).
    ///
    /// # Recovery
    ///
    /// Fix the configuration file and restart; this error never occurs after
    /// startup.
    #[error("invalid gate configuration: {0}")]
    InvalidConfig(String),
}
