//! Gate configuration types.
//!
//! This module defines TOML-deserializable configuration for wiring the
//! gate's backends: where subscription records live, where the plan
//! catalog comes from, and how often the expiry sweep runs. Secrets are
//! referenced by environment variable name and never written inline.

use std::env;
use std::path::Path;

use serde::Deserialize;

use crate::error::{GateError, Result};
use crate::http;

/// Root gate configuration.
///
/// Every section has a default, so an empty file yields a fully
/// in-process gate: memory store, builtin catalog, hourly sweep.
///
/// # Examples
///
/// ```
/// use activity_gate::config::GateConfig;
///
/// let toml = r#"
///     [store]
///     backend = "rest"
///     base_url = "https://subs.example.com"
///
///     [catalog]
///     source = "builtin"
/// "#;
///
/// let config = GateConfig::from_toml_str(toml).unwrap();
/// assert_eq!(config.sweep.interval_secs, 3600);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GateConfig {
    /// Subscription record backend.
    #[serde(default)]
    pub store: StoreConfig,

    /// Plan catalog source.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Expiry sweep scheduling.
    #[serde(default)]
    pub sweep: SweepConfig,
}

impl GateConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidConfig`] if the TOML does not parse or
    /// any section fails validation.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| GateError::InvalidConfig(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidConfig`] if the file cannot be read,
    /// does not parse, or fails validation.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GateError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Validates the configuration.
    ///
    /// Checks that backend URLs are HTTPS and not loopback, auth sections
    /// reference well-formed header and environment variable names, and
    /// the sweep interval is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidConfig`] if any check fails.
    pub fn validate(&self) -> Result<()> {
        self.store.validate()?;
        self.catalog.validate()?;
        self.sweep.validate()?;
        Ok(())
    }
}

/// Subscription record backend selection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    /// In-process memory store; records do not survive a restart.
    #[default]
    Memory,
    /// Subscription service reached over HTTPS.
    Rest {
        /// Base URL of the subscription service.
        base_url: String,
        /// Authentication attached to every request.
        #[serde(default)]
        auth: Option<AuthConfig>,
    },
}

impl StoreConfig {
    fn validate(&self) -> Result<()> {
        match self {
            Self::Memory => Ok(()),
            Self::Rest { base_url, auth } => {
                http::validate_base_url(base_url)?;
                if let Some(auth) = auth {
                    auth.validate()?;
                }
                Ok(())
            }
        }
    }
}

/// Plan catalog source selection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CatalogConfig {
    /// Compiled-in three-tier plan set.
    #[default]
    Builtin,
    /// Catalog service reached over HTTPS.
    Remote {
        /// Base URL of the catalog service.
        base_url: String,
    },
}

impl CatalogConfig {
    fn validate(&self) -> Result<()> {
        match self {
            Self::Builtin => Ok(()),
            Self::Remote { base_url } => http::validate_base_url(base_url).map(|_| ()),
        }
    }
}

fn default_sweep_interval() -> u64 {
    3600
}

/// Expiry sweep scheduling.
#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    /// Seconds between sweep passes (default: 3600).
    #[serde(default = "default_sweep_interval")]
    pub interval_secs: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self { interval_secs: default_sweep_interval() }
    }
}

impl SweepConfig {
    fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            return Err(GateError::InvalidConfig(
                "sweep interval must be at least one second".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Authentication for the subscription service.
///
/// Secrets are referenced by environment variable name; the value is read
/// at wiring time and never appears in the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// API key sent in a custom header.
    ApiKey {
        /// Header name for the API key.
        header: String,
        /// Environment variable containing the key.
        env_var: String,
    },
    /// Bearer token sent in the Authorization header.
    Bearer {
        /// Environment variable containing the token.
        env_var: String,
    },
}

impl AuthConfig {
    /// Validates header and environment variable names.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidConfig`] if a name is empty or contains
    /// invalid characters.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::ApiKey { header, env_var } => {
                validate_header_name(header)?;
                validate_env_var_name(env_var)?;
            }
            Self::Bearer { env_var } => {
                validate_env_var_name(env_var)?;
            }
        }
        Ok(())
    }

    /// Resolves the header to attach, reading the secret from the
    /// environment.
    ///
    /// Returns `(header_name, header_value)`; bearer tokens resolve to an
    /// `Authorization: Bearer ...` header.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidConfig`] if validation fails or the
    /// environment variable is not set.
    pub fn resolve(&self) -> Result<(String, String)> {
        self.validate()?;
        match self {
            Self::ApiKey { header, env_var } => Ok((header.clone(), read_env(env_var)?)),
            Self::Bearer { env_var } => {
                Ok(("Authorization".to_owned(), format!("Bearer {}", read_env(env_var)?)))
            }
        }
    }
}

fn read_env(name: &str) -> Result<String> {
    env::var(name)
        .map_err(|_| GateError::InvalidConfig(format!("environment variable {name} is not set")))
}

/// Validates an environment variable name.
fn validate_env_var_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(GateError::InvalidConfig(
            "environment variable name cannot be empty".to_owned(),
        ));
    }

    // Must be alphanumeric with underscores, starting with letter or underscore
    // We already checked is_empty, so first char exists
    let first_char = name.chars().next().expect("name is not empty");
    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(GateError::InvalidConfig(format!(
            "environment variable name must start with letter or underscore: {name}"
        )));
    }

    for ch in name.chars() {
        if !ch.is_ascii_alphanumeric() && ch != '_' {
            return Err(GateError::InvalidConfig(format!(
                "environment variable name contains invalid character '{ch}': {name}"
            )));
        }
    }

    Ok(())
}

/// Validates an HTTP header name.
fn validate_header_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(GateError::InvalidConfig("header name cannot be empty".to_owned()));
    }

    for ch in name.chars() {
        if !ch.is_ascii_alphanumeric() && ch != '-' {
            return Err(GateError::InvalidConfig(format!(
                "header name contains invalid character '{ch}': {name}"
            )));
        }
    }

    Ok(())
}
