//! Observability infrastructure for the activity gate server.
//!
//! Provides structured logging and health reporting for production
//! deployments.

use std::io;

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Log format configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format for development.
    Pretty,
    /// JSON format for production log aggregation.
    Json,
}

impl LogFormat {
    /// Determines log format from environment.
    ///
    /// Checks `LOG_FORMAT` environment variable:
    /// - `json` => JSON format
    /// - `pretty` or unset => Pretty format
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT").unwrap_or_default().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Initializes observability subsystem with structured logging.
///
/// Configures tracing-subscriber with:
/// - Configurable output format (pretty for dev, JSON for production)
/// - Environment-based log level filtering (`RUST_LOG`, default `info`)
/// - Span events for operation timing
///
/// Logs go to stderr so stdout stays free for shell integration.
pub fn init_observability(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_thread_names(false)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_writer(io::stderr),
                )
                .init();
        }
        LogFormat::Json => {
            subscriber
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_span_list(true)
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_thread_names(false)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_writer(io::stderr),
                )
                .init();
        }
    }
}

/// Overall gate health.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Every backend is reachable.
    Healthy,
    /// Degraded but serving: purchases may fail, browsing works.
    Degraded,
    /// The record store is unreachable; access decisions cannot be made.
    Unhealthy,
}

impl HealthStatus {
    /// Returns string representation for JSON serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

/// Individual health check result.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    /// Check name.
    pub name: String,
    /// Check status.
    pub status: HealthCheckStatus,
    /// Optional message with details.
    pub message: Option<String>,
}

/// Health check status for individual checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthCheckStatus {
    /// Check passed.
    Pass,
    /// Check failed.
    Fail,
    /// Check warning (degraded but operational).
    Warn,
}

impl HealthCheckStatus {
    /// Returns string representation for JSON serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Warn => "warn",
        }
    }
}

impl HealthCheck {
    /// Creates a passing health check with a message.
    #[must_use]
    pub fn pass_with_message<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        Self {
            name: name.into(),
            status: HealthCheckStatus::Pass,
            message: Some(message.into()),
        }
    }

    /// Creates a warning health check for a degraded backend.
    #[must_use]
    pub fn warn<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        Self { name: name.into(), status: HealthCheckStatus::Warn, message: Some(message.into()) }
    }

    /// Creates a failing health check with error message.
    #[must_use]
    pub fn fail<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        Self { name: name.into(), status: HealthCheckStatus::Fail, message: Some(message.into()) }
    }

    #[cfg(test)]
    fn pass(name: impl Into<String>) -> Self {
        Self { name: name.into(), status: HealthCheckStatus::Pass, message: None }
    }
}

/// Overall health report for the gate.
#[derive(Debug, Clone)]
pub struct HealthReport {
    /// Overall gate status.
    pub status: HealthStatus,
    /// Server version.
    pub version: String,
    /// Configured record store backend.
    pub store_backend: String,
    /// Configured plan catalog source.
    pub catalog_source: String,
    /// Uptime in seconds.
    pub uptime_secs: u64,
    /// Individual health checks.
    pub checks: Vec<HealthCheck>,
}

impl HealthReport {
    /// Serializes health report to JSON string.
    ///
    /// # Errors
    ///
    /// Returns error if JSON serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::json!({
            "status": self.status.as_str(),
            "version": self.version,
            "store_backend": self.store_backend,
            "catalog_source": self.catalog_source,
            "uptime_secs": self.uptime_secs,
            "checks": self.checks.iter().map(|c| {
                let mut obj = serde_json::json!({
                    "name": c.name,
                    "status": c.status.as_str(),
                });
                if let Some(msg) = &c.message {
                    obj["message"] = serde_json::Value::String(msg.clone());
                }
                obj
            }).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&json)
    }

    /// Determines overall health status from individual checks.
    #[must_use]
    pub fn compute_status(checks: &[HealthCheck]) -> HealthStatus {
        if checks.iter().any(|c| c.status == HealthCheckStatus::Fail) {
            HealthStatus::Unhealthy
        } else if checks.iter().any(|c| c.status == HealthCheckStatus::Warn) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_env() {
        // SAFETY: This test runs in isolation and only modifies test-specific environment
        // variables. The LOG_FORMAT variable is only used by this test.
        unsafe {
            // Unset environment variable defaults to Pretty
            std::env::remove_var("LOG_FORMAT");
            assert_eq!(LogFormat::from_env(), LogFormat::Pretty);

            // JSON format
            std::env::set_var("LOG_FORMAT", "json");
            assert_eq!(LogFormat::from_env(), LogFormat::Json);

            // Pretty format (explicit)
            std::env::set_var("LOG_FORMAT", "pretty");
            assert_eq!(LogFormat::from_env(), LogFormat::Pretty);

            // Unknown format defaults to Pretty
            std::env::set_var("LOG_FORMAT", "unknown");
            assert_eq!(LogFormat::from_env(), LogFormat::Pretty);

            // Cleanup
            std::env::remove_var("LOG_FORMAT");
        }
    }

    #[test]
    fn test_health_check_pass_with_message() {
        let check = HealthCheck::pass_with_message("record_store", "store reachable");
        assert_eq!(check.name, "record_store");
        assert_eq!(check.status, HealthCheckStatus::Pass);
        assert_eq!(check.message, Some("store reachable".to_owned()));
    }

    #[test]
    fn test_health_check_fail() {
        let check = HealthCheck::fail("record_store", "connection refused");
        assert_eq!(check.status, HealthCheckStatus::Fail);
        assert_eq!(check.message, Some("connection refused".to_owned()));
    }

    #[test]
    fn test_health_check_warn() {
        let check = HealthCheck::warn("plan_catalog", "catalog service unreachable");
        assert_eq!(check.status, HealthCheckStatus::Warn);
    }

    #[test]
    fn test_health_status_compute_all_pass() {
        let checks = vec![HealthCheck::pass("check1"), HealthCheck::pass("check2")];
        assert_eq!(HealthReport::compute_status(&checks), HealthStatus::Healthy);
    }

    #[test]
    fn test_health_status_compute_with_warn() {
        let checks =
            vec![HealthCheck::pass("check1"), HealthCheck::warn("check2", "catalog empty")];
        assert_eq!(HealthReport::compute_status(&checks), HealthStatus::Degraded);
    }

    #[test]
    fn test_health_status_compute_with_fail() {
        let checks = vec![
            HealthCheck::pass("check1"),
            HealthCheck::warn("check2", "catalog empty"),
            HealthCheck::fail("check3", "store down"),
        ];
        assert_eq!(HealthReport::compute_status(&checks), HealthStatus::Unhealthy);
    }

    #[test]
    fn test_health_status_compute_empty() {
        let checks: Vec<HealthCheck> = vec![];
        assert_eq!(HealthReport::compute_status(&checks), HealthStatus::Healthy);
    }

    #[test]
    fn test_health_report_to_json() {
        let report = HealthReport {
            status: HealthStatus::Healthy,
            version: "0.1.0".to_owned(),
            store_backend: "memory".to_owned(),
            catalog_source: "builtin".to_owned(),
            uptime_secs: 3600,
            checks: vec![
                HealthCheck::pass_with_message("record_store", "store reachable"),
                HealthCheck::pass_with_message("plan_catalog", "3 plans offered"),
            ],
        };

        let json = report.to_json().expect("JSON serialization should succeed");
        assert!(json.contains("\"status\": \"healthy\""));
        assert!(json.contains("\"version\": \"0.1.0\""));
        assert!(json.contains("\"store_backend\": \"memory\""));
        assert!(json.contains("\"catalog_source\": \"builtin\""));
        assert!(json.contains("\"uptime_secs\": 3600"));
        assert!(json.contains("\"name\": \"record_store\""));
        assert!(json.contains("\"status\": \"pass\""));
    }

    #[test]
    fn test_health_report_to_json_with_failures() {
        let report = HealthReport {
            status: HealthStatus::Unhealthy,
            version: "0.1.0".to_owned(),
            store_backend: "rest".to_owned(),
            catalog_source: "remote".to_owned(),
            uptime_secs: 60,
            checks: vec![
                HealthCheck::fail("record_store", "connection refused"),
                HealthCheck::warn("plan_catalog", "catalog service unreachable"),
            ],
        };

        let json = report.to_json().expect("JSON serialization should succeed");
        assert!(json.contains("\"status\": \"unhealthy\""));
        assert!(json.contains("\"status\": \"fail\""));
        assert!(json.contains("\"status\": \"warn\""));
        assert!(json.contains("\"message\": \"connection refused\""));
    }

    #[test]
    fn test_health_check_status_as_str() {
        assert_eq!(HealthCheckStatus::Pass.as_str(), "pass");
        assert_eq!(HealthCheckStatus::Fail.as_str(), "fail");
        assert_eq!(HealthCheckStatus::Warn.as_str(), "warn");
    }

    #[test]
    fn test_health_status_as_str() {
        assert_eq!(HealthStatus::Healthy.as_str(), "healthy");
        assert_eq!(HealthStatus::Degraded.as_str(), "degraded");
        assert_eq!(HealthStatus::Unhealthy.as_str(), "unhealthy");
    }
}
