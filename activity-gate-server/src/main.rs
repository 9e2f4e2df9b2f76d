//! Activity gate server - service host for subscription gating
//!
//! Loads the gate configuration, wires the configured record store and
//! plan catalog, reports startup health, and runs the periodic expiry
//! sweep until shutdown.
//!
//! # Environment Variables
//!
//! - `GATE_CONFIG`: Path to the TOML configuration. When unset, `gate.toml`
//!   is used if present, otherwise in-process defaults.
//! - `LOG_FORMAT`: `json` or `pretty` (default: `pretty`)
//! - `RUST_LOG`: Log level filter (default: `info`)

#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest"
)]

mod observability;

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use activity_gate::{
    Result,
    catalog::{BuiltinPlanCatalog, PlanCatalog, RemotePlanCatalog},
    config::{CatalogConfig, GateConfig, StoreConfig},
    subscription::{MemoryRecordStore, RecordStore, RestRecordStore, SubscriptionStore, UserId},
};
use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::observability::{HealthCheck, HealthReport, LogFormat, init_observability};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_CONFIG_PATH: &str = "gate.toml";

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_observability(LogFormat::from_env());

    let config = load_config()?;
    let records = build_record_store(&config.store)?;
    let plans = build_plan_catalog(&config.catalog)?;
    let store = SubscriptionStore::new(records, Arc::clone(&plans));

    info!(
        version = VERSION,
        store = store_backend_name(&config.store),
        catalog = catalog_source_name(&config.catalog),
        sweep_interval_secs = config.sweep.interval_secs,
        "Activity gate server starting"
    );

    let started = Instant::now();
    let report = startup_report(&store, plans.as_ref(), &config, started).await;
    match report.to_json() {
        Ok(json) => info!(status = report.status.as_str(), "Startup health:\n{json}"),
        Err(e) => warn!("Failed to serialize health report: {e}"),
    }

    run_sweep_loop(&store, config.sweep.interval_secs).await;

    info!(uptime_secs = started.elapsed().as_secs(), "Activity gate server stopped");
    Ok(())
}

/// Resolves and loads the gate configuration.
///
/// An explicitly configured path must load; the implicit default path may
/// be absent, in which case the gate runs on in-process backends.
fn load_config() -> Result<GateConfig> {
    if let Ok(path) = std::env::var("GATE_CONFIG") {
        info!(path, "Loading gate configuration");
        return GateConfig::from_toml_file(&path);
    }

    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        info!(path = DEFAULT_CONFIG_PATH, "Loading gate configuration");
        return GateConfig::from_toml_file(DEFAULT_CONFIG_PATH);
    }

    info!("No configuration file found; using in-process defaults");
    Ok(GateConfig::default())
}

/// Builds the configured record store backend.
fn build_record_store(config: &StoreConfig) -> Result<Arc<dyn RecordStore>> {
    match config {
        StoreConfig::Memory => Ok(Arc::new(MemoryRecordStore::new())),
        StoreConfig::Rest { base_url, auth } => {
            let mut store = RestRecordStore::new(base_url)?;
            if let Some(auth) = auth {
                let (header, value) = auth.resolve()?;
                store = store.with_auth(&header, &value)?;
            }
            Ok(Arc::new(store))
        }
    }
}

/// Builds the configured plan catalog source.
fn build_plan_catalog(config: &CatalogConfig) -> Result<Arc<dyn PlanCatalog>> {
    match config {
        CatalogConfig::Builtin => Ok(Arc::new(BuiltinPlanCatalog::new())),
        CatalogConfig::Remote { base_url } => Ok(Arc::new(RemotePlanCatalog::new(base_url)?)),
    }
}

fn store_backend_name(config: &StoreConfig) -> &'static str {
    match config {
        StoreConfig::Memory => "memory",
        StoreConfig::Rest { .. } => "rest",
    }
}

fn catalog_source_name(config: &CatalogConfig) -> &'static str {
    match config {
        CatalogConfig::Builtin => "builtin",
        CatalogConfig::Remote { .. } => "remote",
    }
}

/// Probes both backends and assembles the startup health report.
///
/// A record store failure is fatal to access decisions, so it reports
/// `fail`. A plan catalog failure only blocks purchases while browsing
/// keeps working, so it reports `warn`.
async fn startup_report(
    store: &SubscriptionStore,
    plans: &dyn PlanCatalog,
    config: &GateConfig,
    started: Instant,
) -> HealthReport {
    let mut checks = Vec::new();

    // "health-probe" satisfies the user id charset, so this cannot fail
    let probe = UserId::new("health-probe").expect("probe id should be valid");
    match store.get_subscription(&probe).await {
        Ok(_) => checks.push(HealthCheck::pass_with_message("record_store", "store reachable")),
        Err(e) => checks.push(HealthCheck::fail("record_store", e.to_string())),
    }

    match plans.list_plans().await {
        Ok(list) if list.is_empty() => {
            checks.push(HealthCheck::warn(
                "plan_catalog",
                "catalog is empty; plan selection renders empty",
            ));
        }
        Ok(list) => {
            checks.push(HealthCheck::pass_with_message(
                "plan_catalog",
                format!("{} plans offered", list.len()),
            ));
        }
        Err(e) => checks.push(HealthCheck::warn("plan_catalog", e.to_string())),
    }

    HealthReport {
        status: HealthReport::compute_status(&checks),
        version: VERSION.to_owned(),
        store_backend: store_backend_name(&config.store).to_owned(),
        catalog_source: catalog_source_name(&config.catalog).to_owned(),
        uptime_secs: started.elapsed().as_secs(),
        checks,
    }
}

/// Runs the expiry sweep on its configured interval until Ctrl-C.
///
/// Sweep failures are logged and retried on the next tick; the sweep is
/// bookkeeping, and access decisions never depend on it.
async fn run_sweep_loop(store: &SubscriptionStore, interval_secs: u64) {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match store.sweep_expired(Utc::now()).await {
                    Ok(0) => {}
                    Ok(flipped) => info!(flipped, "Expiry sweep complete"),
                    Err(e) => warn!("Expiry sweep failed: {e}"),
                }
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    error!("Failed to listen for shutdown signal: {e}");
                }
                info!("Shutdown signal received");
                break;
            }
        }
    }
}
