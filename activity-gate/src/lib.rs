//! Activity Gate: Subscription-Based Access Control for Activity Catalogs
//!
//! A Rust library that decides what a viewer of an educational activity
//! catalog may open, based on their subscription. It owns the subscription
//! lifecycle (subscribe, cancel, expire) and derives a single entitlement
//! that every surface of an application applies uniformly.
//!
//! # What is Activity Gate?
//!
//! This library answers one question consistently everywhere it is asked:
//! may this viewer, right now, open this activity? It provides:
//!
//! - **Pure Entitlement Derivation**: Free or subscribed, computed from the
//!   subscription record and a caller-supplied clock, with no side effects
//! - **Atomic Subscription Lifecycle**: Success is reported only after the
//!   record is durably persisted; there is no optimistic state
//! - **Uniform Catalog Gating**: One entitlement gates the whole catalog;
//!   a viewer never sees a mix of locked and unlocked premium items
//! - **Deny by Default**: Unknown viewers and lapsed subscriptions browse
//!   the free tier; nothing unlocks without an active record
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │    Viewer    │  Anonymous or signed-in user
//! └──────┬───────┘
//!        │ browse / open / subscribe / cancel
//!        │
//! ┌──────▼──────────────────────────────────────────────┐
//! │              Activity Gate (this crate)             │
//! │  ┌─────────────┐        ┌──────────────────────┐    │
//! │  │ ContentGate │────────│ EntitlementEvaluator │    │
//! │  └──────┬──────┘        └──────────┬───────────┘    │
//! │         │                          │                │
//! │  ┌──────▼────────────┐  ┌──────────▼────────────┐   │
//! │  │ ActivityDirectory │  │   SubscriptionStore   │   │
//! │  └───────────────────┘  └──────────┬────────────┘   │
//! └────────────────────────────────────┼────────────────┘
//!                                      │ HTTPS (optional REST backends)
//!                         ┌────────────▼────────────┐
//!                         │ Subscription & catalog  │
//!                         │        services         │
//!                         └─────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## 1. Browse a Gated Catalog
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use activity_gate::{
//!     CurrentUser,
//!     activities::{Activity, StaticActivityDirectory},
//!     catalog::BuiltinPlanCatalog,
//!     entitlement::EntitlementEvaluator,
//!     gate::ContentGate,
//!     subscription::{MemoryRecordStore, SubscriptionStore},
//! };
//! use chrono::Utc;
//!
//! # async fn example() -> activity_gate::error::Result<()> {
//! // Wire in-process backends (REST backends are available for production)
//! let store = SubscriptionStore::new(
//!     Arc::new(MemoryRecordStore::new()),
//!     Arc::new(BuiltinPlanCatalog::new()),
//! );
//! let evaluator = EntitlementEvaluator::new(store);
//! let directory = StaticActivityDirectory::new(vec![
//!     Activity::new("volcano-1", "Baking Soda Volcano"),
//!     Activity::new("paper-crane", "Origami Paper Crane"),
//! ]);
//! let gate = ContentGate::new(Arc::new(directory), evaluator);
//!
//! // Anonymous viewers browse the free tier
//! let catalog = gate.browse(&CurrentUser::Anonymous, Utc::now()).await?;
//! for entry in &catalog {
//!     println!("{} (accessible: {})", entry.activity.title, entry.accessible);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## 2. Subscribe a Signed-In User
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use activity_gate::{
//!     CurrentUser,
//!     catalog::BuiltinPlanCatalog,
//!     lifecycle::SubscriptionController,
//!     subscription::{MemoryRecordStore, SubscriptionStore, UserId},
//! };
//! use chrono::Utc;
//!
//! # async fn example() -> activity_gate::error::Result<()> {
//! let plans = Arc::new(BuiltinPlanCatalog::new());
//! let store = SubscriptionStore::new(Arc::new(MemoryRecordStore::new()), plans.clone());
//! let controller = SubscriptionController::new(plans, store);
//!
//! let viewer = CurrentUser::SignedIn(UserId::new("user-123")?);
//! let record = controller.subscribe(&viewer, "premium", Utc::now()).await?;
//!
//! println!("Subscribed to {} until {}", record.plan_id, record.period_end);
//! # Ok(())
//! # }
//! ```
//!
//! ## 3. Derive an Entitlement Directly
//!
//! ```rust
//! use activity_gate::entitlement::Entitlement;
//! use chrono::Utc;
//!
//! // No record means the free tier, always
//! let entitlement = Entitlement::derive(None, Utc::now());
//! assert!(!entitlement.is_subscribed());
//! ```
//!
//! # Module Organization
//!
//! - [`activities`]: Activity metadata and the directory the gate draws from
//! - [`catalog`]: Subscription plans (builtin tiers or a remote catalog service)
//! - [`config`]: TOML configuration for backend wiring
//! - [`entitlement`]: Pure entitlement derivation and the evaluator
//! - [`error`]: Error types with recovery guidance
//! - [`gate`]: Catalog gating and the activity launch guard
//! - [`lifecycle`]: Subscribe and cancel orchestration
//! - [`reliability`]: Retry with exponential backoff for transient failures
//! - [`session`]: Viewer identity (anonymous or signed in)
//! - [`signal`]: Route signals that tell a UI layer where to send the viewer
//! - [`subscription`]: Subscription records and their stores
//!
//! # Gating Rules
//!
//! One rule set, applied everywhere:
//!
//! - **No record**: free tier
//! - **Status not active**: free tier, even inside the paid period
//! - **Period end reached**: free tier (the boundary instant is already free)
//! - **Otherwise**: subscribed, until the period end
//!
//! Derivation is deterministic and read-only. Evaluating an entitlement
//! never mutates a record; expiry is a consequence of the clock, not of
//! being observed. A background sweep marks lapsed records `expired` for
//! reporting, but access decisions never wait for it.
//!
//! # Subscription Lifecycle
//!
//! - **Subscribe**: requires a signed-in viewer and a plan present in the
//!   catalog, checked in that order before any state changes. Success is
//!   reported only after the record is durably persisted.
//! - **Duplicate purchase**: a user with an active subscription cannot buy
//!   a second one; the attempt is informational, not a failure.
//! - **Cancel**: flips an active record to `cancelled` in place. Access
//!   ends immediately; the record stays behind for history and a later
//!   purchase replaces it.
//!
//! # Error Handling
//!
//! All operations return [`Result<T, GateError>`](error::Result). Each error
//! maps to a [`RouteSignal`] so UI layers route viewers instead of
//! interpreting error internals:
//!
//! ```rust
//! use activity_gate::{GateError, RouteSignal};
//!
//! let signal = RouteSignal::from(&GateError::Unauthenticated);
//! assert_eq!(signal, RouteSignal::RedirectToLogin);
//!
//! let signal = RouteSignal::from(&GateError::NotSubscribed);
//! assert_eq!(signal, RouteSignal::RedirectToSubscribe);
//! ```
//!
//! Degraded operation is explicit: a [`GateError::CatalogUnavailable`] from
//! the plan catalog blocks new purchases but never blocks browsing, because
//! the free tier requires no catalog at all.
//!
//! # Examples
//!
//! See the `examples/` directory for complete usage examples:
//! - `browse_catalog.rs`: Gated browsing as anonymous and subscribed viewers
//! - `subscribe_flow.rs`: Full subscribe, browse, cancel, expire flow
//! - `error_handling.rs`: Handling and routing common errors

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest"
)]

pub mod activities;
pub mod catalog;
pub mod config;
pub mod entitlement;
pub mod error;
pub mod gate;
mod http;
pub mod lifecycle;
pub mod reliability;
pub mod session;
pub mod signal;
pub mod subscription;

pub use error::{GateError, Result};
pub use session::CurrentUser;
pub use signal::RouteSignal;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify public API is accessible
        let _ = std::marker::PhantomData::<GateError>;
    }
}
