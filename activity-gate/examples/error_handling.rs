//! Error handling example showing how gate outcomes are routed.
//!
//! Every error a gate operation can produce maps to exactly one routing
//! signal. This example triggers the common failures against in-process
//! backends and shows the recovery for each.
//!
//! # Running this example
//!
//! ```bash
//! cargo run --example error_handling
//! ```

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::str_to_string,
    clippy::uninlined_format_args,
    reason = "examples are allowed to use println and simple formatting"
)]

use std::sync::Arc;

use activity_gate::{
    CurrentUser, GateError, RouteSignal,
    activities::{Activity, StaticActivityDirectory},
    catalog::{BuiltinPlanCatalog, PlanCatalog},
    entitlement::EntitlementEvaluator,
    gate::ContentGate,
    lifecycle::SubscriptionController,
    signal::Severity,
    subscription::{MemoryRecordStore, SubscriptionStore, UserId},
};
use chrono::Utc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Activity Gate: Error Handling Example\n");

    let plans: Arc<dyn PlanCatalog> = Arc::new(BuiltinPlanCatalog::new());
    let store = SubscriptionStore::new(Arc::new(MemoryRecordStore::new()), Arc::clone(&plans));
    let controller = SubscriptionController::new(Arc::clone(&plans), store.clone());
    let directory = Arc::new(StaticActivityDirectory::new(vec![Activity::new(
        "volcano-1",
        "Baking Soda Volcano",
    )]));
    let gate = ContentGate::new(directory, EntitlementEvaluator::new(store));

    let now = Utc::now();
    let viewer = CurrentUser::SignedIn(UserId::new("user-123")?);

    // Example 1: Anonymous purchase attempt (should redirect to login)
    println!("Example 1: Subscribing while signed out");
    match controller.subscribe(&CurrentUser::Anonymous, "premium", now).await {
        Ok(_) => println!("   Unexpected success"),
        Err(e @ GateError::Unauthenticated) => {
            println!("   ✓ Rejected before any backend was contacted");
            println!("   Route: {:?}", RouteSignal::from(&e));
        }
        Err(e) => println!("   Unexpected error: {}", e),
    }

    // Example 2: Unknown plan (should fail validation)
    println!("\nExample 2: Subscribing to a plan the catalog does not offer");
    match controller.subscribe(&viewer, "mega-ultra", now).await {
        Ok(_) => println!("   Unexpected success"),
        Err(GateError::InvalidPlan(msg)) => {
            println!("   ✓ Caught validation error: {}", msg);
            println!("   Recovery: Re-fetch the plan list and render the selection again");
        }
        Err(e) => println!("   Unexpected error: {}", e),
    }

    // Example 3: Duplicate purchase (informational, not a failure)
    println!("\nExample 3: Buying a second subscription");
    controller.subscribe(&viewer, "basic", now).await?;
    let result = controller.subscribe(&viewer, "premium", now).await;
    let signal = RouteSignal::from_outcome(&result);
    match signal.severity() {
        Severity::Info => println!("   ✓ Surfaced as a notice, not an error banner"),
        Severity::Error => println!("   Unexpected severity"),
    }

    // Example 4: Cancelling without a subscription
    println!("\nExample 4: Cancelling with nothing to cancel");
    let stranger = CurrentUser::SignedIn(UserId::new("user-999")?);
    match controller.cancel(&stranger, now).await {
        Ok(_) => println!("   Unexpected success"),
        Err(e @ GateError::NotSubscribed) => {
            println!("   ✓ Nothing to cancel");
            println!("   Route: {:?}", RouteSignal::from(&e));
        }
        Err(e) => println!("   Unexpected error: {}", e),
    }

    // Example 5: Opening an activity that does not exist
    println!("\nExample 5: Opening an unknown activity");
    match gate.open(&viewer, "no-such-activity", now).await {
        Ok(_) => println!("   Unexpected success"),
        Err(GateError::ActivityNotFound(id)) => {
            println!("   ✓ Unknown activity id: {}", id);
            println!("   Recovery: Return the viewer to the catalog listing");
        }
        Err(e) => println!("   Unexpected error: {}", e),
    }

    // Example 6: Comprehensive error matching
    println!("\nExample 6: Comprehensive error pattern matching");
    let result = controller.subscribe(&CurrentUser::Anonymous, "premium", now).await;
    if let Err(e) = result {
        explain(&e);
    }

    println!("\n✓ Error handling examples complete");
    Ok(())
}

/// Demonstrates comprehensive error handling with recovery guidance.
fn explain(error: &GateError) {
    let route = RouteSignal::from(error);

    match error {
        // Identity errors - send the viewer to sign in
        GateError::Unauthenticated => {
            eprintln!("   ✗ Viewer is not signed in");
            eprintln!("   → Route: {:?}", route);
            eprintln!("   → Retry: After the viewer signs in");
        }
        GateError::InvalidUserId(msg) => {
            eprintln!("   ✗ Malformed user id: {}", msg);
            eprintln!("   → Fix: The session layer produced a bad id; sign the viewer out");
        }

        // Selection errors - fix input and retry
        GateError::InvalidPlan(msg) => {
            eprintln!("   ✗ Unknown plan: {}", msg);
            eprintln!("   → Fix: Offer only plans returned by the catalog");
            eprintln!("   → Retry: After the viewer picks a listed plan");
        }
        GateError::ActivityNotFound(id) => {
            eprintln!("   ✗ Unknown activity: {}", id);
            eprintln!("   → Fix: Remove stale links to deleted activities");
        }

        // State notices - nothing went wrong for the viewer
        GateError::AlreadySubscribed => {
            eprintln!("   ✓ Already subscribed; show a notice, not an error");
        }
        GateError::NotSubscribed => {
            eprintln!("   ✗ No active subscription");
            eprintln!("   → Route: {:?}", route);
        }

        // Backend errors - retry with backoff
        GateError::PersistenceFailure(msg) => {
            eprintln!("   ✗ Record store failure: {}", msg);
            eprintln!("   → Retry: Use exponential backoff strategy");
            eprintln!("   → Note: The purchase was not recorded; nothing was granted");
        }
        GateError::CatalogUnavailable(msg) => {
            eprintln!("   ✗ Plan catalog unreachable: {}", msg);
            eprintln!("   → Retry: Use exponential backoff strategy");
            eprintln!("   → Note: Browsing the free tier keeps working");
        }

        // Configuration errors - fix deployment
        GateError::InvalidConfig(msg) => {
            eprintln!("   ✗ Configuration error: {}", msg);
            eprintln!("   → Fix: Correct the gate configuration and redeploy");
        }
    }
}
