//! REST-backed subscription record store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use super::models::{SubscriptionRecord, SubscriptionStatus, UserId};
use super::persistence::RecordStore;
use crate::error::{GateError, Result};
use crate::http::{self, AuthHeader};
use crate::reliability::{RetryPolicy, retry_with_backoff};

/// Wire shape of a status update.
#[derive(Debug, Serialize)]
struct StatusPatch {
    status: SubscriptionStatus,
}

/// Wire shape of a sweep request.
#[derive(Debug, Serialize)]
struct SweepRequest {
    now: DateTime<Utc>,
}

/// Wire shape of a sweep response.
#[derive(Debug, Deserialize)]
struct SweepResponse {
    expired: usize,
}

/// Record store backed by a subscription service over HTTPS.
///
/// Records live at `{base_url}/subscriptions/{user_id}`; creation posts to
/// `{base_url}/subscriptions` with a fresh `Idempotency-Key` so the service
/// can deduplicate an accidentally repeated purchase. Reads are retried
/// with exponential backoff; writes are sent exactly once, because a
/// blindly retried purchase could charge twice. Transport failures surface
/// as [`GateError::PersistenceFailure`] without leaking raw client errors
/// to callers.
#[derive(Debug, Clone)]
pub struct RestRecordStore {
    base_url: String,
    client: Client,
    auth: Option<AuthHeader>,
    retry: RetryPolicy,
}

impl RestRecordStore {
    /// Creates a store client for the given service base URL.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidConfig`] if the URL is not HTTPS, points
    /// at localhost, or contains traversal sequences.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: http::validate_base_url(base_url)?,
            client: http::client(),
            auth: None,
            retry: RetryPolicy::default(),
        })
    }

    /// Attaches an authentication header to every request.
    ///
    /// The value is redacted from debug output.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidConfig`] if the value contains control
    /// characters.
    pub fn with_auth(mut self, header_name: &str, value: &str) -> Result<Self> {
        self.auth = Some(AuthHeader::new(header_name.to_owned(), value.to_owned())?);
        Ok(self)
    }

    /// Replaces the retry policy used for record reads.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Some(auth) => auth.apply(request),
            None => request,
        }
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn fetch_once(&self, user_id: &UserId) -> Result<Option<SubscriptionRecord>> {
        let url = format!("{}/subscriptions/{user_id}", self.base_url);

        let response = self
            .authed(self.client.get(&url))
            .send()
            .await
            .map_err(|e| GateError::PersistenceFailure(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(GateError::PersistenceFailure(format!(
                "subscription service returned status {}",
                response.status().as_u16()
            )));
        }

        let record: SubscriptionRecord = response
            .json()
            .await
            .map_err(|e| GateError::PersistenceFailure(format!("malformed record: {e}")))?;

        Ok(Some(record))
    }
}

#[async_trait]
impl RecordStore for RestRecordStore {
    async fn fetch(&self, user_id: &UserId) -> Result<Option<SubscriptionRecord>> {
        retry_with_backoff(&self.retry, || self.fetch_once(user_id)).await
    }

    async fn insert(&self, record: &SubscriptionRecord) -> Result<()> {
        let url = format!("{}/subscriptions", self.base_url);

        let response = self
            .authed(self.client.post(&url))
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .json(record)
            .send()
            .await
            .map_err(|e| GateError::PersistenceFailure(e.to_string()))?;

        if response.status() == StatusCode::CONFLICT {
            return Err(GateError::AlreadySubscribed);
        }

        if !response.status().is_success() {
            return Err(GateError::PersistenceFailure(format!(
                "subscription service returned status {}",
                response.status().as_u16()
            )));
        }

        Ok(())
    }

    async fn update_status(
        &self,
        user_id: &UserId,
        status: SubscriptionStatus,
    ) -> Result<Option<SubscriptionRecord>> {
        let url = format!("{}/subscriptions/{user_id}", self.base_url);

        let response = self
            .authed(self.client.patch(&url))
            .json(&StatusPatch { status })
            .send()
            .await
            .map_err(|e| GateError::PersistenceFailure(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(GateError::PersistenceFailure(format!(
                "subscription service returned status {}",
                response.status().as_u16()
            )));
        }

        let record: SubscriptionRecord = response
            .json()
            .await
            .map_err(|e| GateError::PersistenceFailure(format!("malformed record: {e}")))?;

        Ok(Some(record))
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let url = format!("{}/subscriptions/sweep", self.base_url);

        let response = self
            .authed(self.client.post(&url))
            .json(&SweepRequest { now })
            .send()
            .await
            .map_err(|e| GateError::PersistenceFailure(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GateError::PersistenceFailure(format!(
                "subscription service returned status {}",
                response.status().as_u16()
            )));
        }

        let body: SweepResponse = response
            .json()
            .await
            .map_err(|e| GateError::PersistenceFailure(format!("malformed sweep reply: {e}")))?;

        Ok(body.expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_https_url() {
        assert!(RestRecordStore::new("https://subs.example.com").is_ok());
    }

    #[test]
    fn test_new_rejects_http_and_localhost() {
        assert!(matches!(
            RestRecordStore::new("http://subs.example.com"),
            Err(GateError::InvalidConfig(_))
        ));
        assert!(matches!(
            RestRecordStore::new("https://127.0.0.1/subs"),
            Err(GateError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_with_auth_rejects_control_characters() {
        let store = RestRecordStore::new("https://subs.example.com").unwrap();
        let result = store.with_auth("Authorization", "Bearer abc\r\nEvil: yes");
        assert!(matches!(result, Err(GateError::InvalidConfig(_))));
    }

    #[test]
    fn test_debug_output_redacts_auth_value() {
        let store = RestRecordStore::new("https://subs.example.com")
            .unwrap()
            .with_auth("X-Api-Key", "super-secret")
            .unwrap();

        let debug = format!("{store:?}");
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_status_patch_wire_shape() {
        let patch = StatusPatch { status: SubscriptionStatus::Cancelled };
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"status":"cancelled"}"#);
    }

    #[test]
    fn test_sweep_response_parses() {
        let body: SweepResponse = serde_json::from_str(r#"{"expired":7}"#).unwrap();
        assert_eq!(body.expired, 7);
    }
}
