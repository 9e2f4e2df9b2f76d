//! Remote plan catalog backed by a catalog service.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{instrument, warn};

use super::PlanCatalog;
use super::models::{Plan, PlanId};
use crate::error::{GateError, Result};
use crate::http;
use crate::reliability::{RetryPolicy, retry_with_backoff};

/// Wire shape of the plan list endpoint.
#[derive(Debug, Deserialize)]
struct PlanListResponse {
    plans: Vec<Plan>,
}

/// Plan catalog fetched from a catalog service over HTTPS.
///
/// Lists come from `GET {base_url}/plans` and lookups from
/// `GET {base_url}/plans/{id}`. Transient fetch failures are retried with
/// exponential backoff; exhausted retries surface as
/// [`GateError::CatalogUnavailable`], which callers treat as recoverable
/// (retry later, not crash). Malformed plan entries are skipped with a
/// warning rather than poisoning the whole list.
#[derive(Debug, Clone)]
pub struct RemotePlanCatalog {
    base_url: String,
    client: Client,
    retry: RetryPolicy,
}

impl RemotePlanCatalog {
    /// Creates a catalog client for the given service base URL.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidConfig`] if the URL is not HTTPS, points
    /// at localhost, or contains traversal sequences.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: http::validate_base_url(base_url)?,
            client: http::client(),
            retry: RetryPolicy::default(),
        })
    }

    /// Replaces the retry policy used for catalog reads.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_plans(&self) -> Result<Vec<Plan>> {
        let url = format!("{}/plans", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GateError::CatalogUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GateError::CatalogUnavailable(format!(
                "catalog service returned status {}",
                response.status().as_u16()
            )));
        }

        let body: PlanListResponse = response
            .json()
            .await
            .map_err(|e| GateError::CatalogUnavailable(format!("malformed plan list: {e}")))?;

        let mut plans = Vec::with_capacity(body.plans.len());
        for plan in body.plans {
            if plan.is_well_formed() {
                plans.push(plan);
            } else {
                warn!(plan_id = %plan.id, "Skipping malformed plan entry from catalog service");
            }
        }

        Ok(plans)
    }

    #[instrument(skip(self), fields(base_url = %self.base_url, plan_id = %id))]
    async fn fetch_plan(&self, id: &PlanId) -> Result<Option<Plan>> {
        let url = format!("{}/plans/{id}", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GateError::CatalogUnavailable(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(GateError::CatalogUnavailable(format!(
                "catalog service returned status {}",
                response.status().as_u16()
            )));
        }

        let plan: Plan = response
            .json()
            .await
            .map_err(|e| GateError::CatalogUnavailable(format!("malformed plan entry: {e}")))?;

        if !plan.is_well_formed() {
            warn!(plan_id = %plan.id, "Catalog service returned a malformed plan entry");
            return Ok(None);
        }

        Ok(Some(plan))
    }
}

#[async_trait]
impl PlanCatalog for RemotePlanCatalog {
    async fn list_plans(&self) -> Result<Vec<Plan>> {
        retry_with_backoff(&self.retry, || self.fetch_plans()).await
    }

    async fn get_plan(&self, id: &PlanId) -> Result<Option<Plan>> {
        retry_with_backoff(&self.retry, || self.fetch_plan(id)).await
    }
}
