//! Subscription record persistence backends.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::models::{SubscriptionRecord, SubscriptionStatus, UserId};
use crate::error::{GateError, Result};

/// Durable storage for subscription records.
///
/// Implementations keep at most one record per user: an insert while an
/// active, unexpired record exists for the same user must fail with
/// [`GateError::AlreadySubscribed`] and leave the stored record
/// untouched. Reads of a missing record are `Ok(None)`, never an error.
#[async_trait]
pub trait RecordStore: Send + Sync + fmt::Debug {
    /// Looks up the record for a user.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::PersistenceFailure`] if the backend cannot be
    /// reached.
    async fn fetch(&self, user_id: &UserId) -> Result<Option<SubscriptionRecord>>;

    /// Persists a freshly created record.
    ///
    /// Replaces any cancelled or lapsed record for the same user. The
    /// duplicate check uses the new record's `created_at` as the purchase
    /// instant.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::AlreadySubscribed`] if an active, unexpired
    /// record already exists for the user, or
    /// [`GateError::PersistenceFailure`] if the backend cannot be reached.
    async fn insert(&self, record: &SubscriptionRecord) -> Result<()>;

    /// Updates the status of a user's record in place.
    ///
    /// Returns the updated record, or `Ok(None)` when the user has no
    /// record to update.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::PersistenceFailure`] if the backend cannot be
    /// reached.
    async fn update_status(
        &self,
        user_id: &UserId,
        status: SubscriptionStatus,
    ) -> Result<Option<SubscriptionRecord>>;

    /// Marks every active record whose window ended at or before `now` as
    /// expired, returning how many records were flipped.
    ///
    /// The sweep is bookkeeping only: the entitlement read path already
    /// treats lapsed records as expired, swept or not.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::PersistenceFailure`] if the backend cannot be
    /// reached.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize>;
}

/// In-memory record store.
///
/// Backs tests, examples, and single-process deployments. Cloning shares
/// the underlying map, so clones observe each other's writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: Arc<RwLock<HashMap<UserId, SubscriptionRecord>>>,
}

impl MemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true if no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn fetch(&self, user_id: &UserId) -> Result<Option<SubscriptionRecord>> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn insert(&self, record: &SubscriptionRecord) -> Result<()> {
        // Single write lock covers the duplicate check and the insert, so
        // two concurrent purchases cannot both succeed.
        let mut records = self.records.write().await;

        if let Some(existing) = records.get(&record.user_id)
            && existing.is_active_at(record.created_at)
        {
            return Err(GateError::AlreadySubscribed);
        }

        records.insert(record.user_id.clone(), record.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        user_id: &UserId,
        status: SubscriptionStatus,
    ) -> Result<Option<SubscriptionRecord>> {
        let mut records = self.records.write().await;

        match records.get_mut(user_id) {
            Some(record) => {
                record.status = status;
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut records = self.records.write().await;

        let mut flipped = 0;
        for record in records.values_mut() {
            if record.status == SubscriptionStatus::Active && record.period_end <= now {
                record.status = SubscriptionStatus::Expired;
                flipped += 1;
            }
        }

        Ok(flipped)
    }
}
