//! Subscription records and their persistence.
//!
//! A user holds at most one [`SubscriptionRecord`]; purchases create it,
//! cancellation and the expiry sweep update its status in place, and a new
//! purchase may replace it once it no longer grants access. The
//! [`SubscriptionStore`] wraps a [`RecordStore`] backend with plan
//! validation so nothing is ever persisted for a plan the catalog does not
//! offer.
//!
//! Two backends are provided: [`MemoryRecordStore`] for tests and
//! single-process deployments, and [`RestRecordStore`] for a subscription
//! service reached over HTTPS.

mod models;
mod persistence;
mod rest;
mod store;

pub use self::models::{GRANT_PERIOD_DAYS, SubscriptionRecord, SubscriptionStatus, UserId};
pub use self::persistence::{MemoryRecordStore, RecordStore};
pub use self::rest::RestRecordStore;
pub use self::store::SubscriptionStore;
