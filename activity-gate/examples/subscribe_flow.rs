//! Subscription lifecycle example.
//!
//! Walks subscriptions from purchase through cancellation, lapse, and
//! renewal, driving the clock by hand to show how access changes over
//! time. Runs entirely offline on in-process backends.
//!
//! # Running this example
//!
//! ```bash
//! cargo run --example subscribe_flow
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
    CurrentUser, GateError,
    activities::{Activity, StaticActivityDirectory},
    catalog::{BuiltinPlanCatalog, PlanCatalog},
    entitlement::EntitlementEvaluator,
    gate::ContentGate,
    lifecycle::SubscriptionController,
    subscription::{MemoryRecordStore, SubscriptionStore, UserId},
};
use chrono::{DateTime, Duration, Utc};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Activity Gate: Subscription Lifecycle Example\n");

    let plans: Arc<dyn PlanCatalog> = Arc::new(BuiltinPlanCatalog::new());
    let store = SubscriptionStore::new(Arc::new(MemoryRecordStore::new()), Arc::clone(&plans));
    let controller = SubscriptionController::new(Arc::clone(&plans), store.clone());
    let directory = Arc::new(StaticActivityDirectory::new(vec![
        Activity::new("volcano-1", "Baking Soda Volcano"),
        Activity::new("paper-crane", "Origami Paper Crane"),
    ]));
    let gate = ContentGate::new(directory, EntitlementEvaluator::new(store.clone()));

    let viewer = CurrentUser::SignedIn(UserId::new("user-456")?);
    let purchase = Utc::now();

    // Step 1: Subscribe
    println!("1. Subscribing user-456 to the basic plan...");
    let record = controller.subscribe(&viewer, "basic", purchase).await?;
    println!("   ✓ Active from {} until {}", record.created_at, record.period_end);

    // Step 2: A second purchase is reported, not performed
    println!("\n2. Attempting a second purchase while active...");
    match controller.subscribe(&viewer, "premium", purchase + Duration::days(1)).await {
        Ok(_) => println!("   Unexpected success"),
        Err(GateError::AlreadySubscribed) => {
            println!("   ✓ Already subscribed; nothing was charged");
        }
        Err(e) => eprintln!("   Unexpected error: {}", e),
    }

    // Step 3: Cancel ten days in
    println!("\n3. Cancelling ten days into the period...");
    let cancelled = controller.cancel(&viewer, purchase + Duration::days(10)).await?;
    println!("   ✓ Status is now {}", cancelled.status);

    // Step 4: A cancelled record grants nothing further
    println!("\n4. Browsing fifteen days into the period...");
    let open = count_accessible(&gate, &viewer, purchase + Duration::days(15)).await?;
    println!("   Accessible activities: {} (access ended at cancellation)", open);

    // Step 5: An uncancelled subscription runs to its period end exactly
    println!("\n5. user-789 subscribed the same day and never cancelled...");
    let other = CurrentUser::SignedIn(UserId::new("user-789")?);
    let other_record = controller.subscribe(&other, "family", purchase).await?;

    let open =
        count_accessible(&gate, &other, other_record.period_end - Duration::seconds(1)).await?;
    println!("   Accessible one second before the period end: {}", open);
    let open = count_accessible(&gate, &other, other_record.period_end).await?;
    println!("   Accessible at the period end: {} (the boundary instant is already free)", open);

    // Step 6: A record left active past its window is swept
    println!("\n6. Running the expiry sweep a day after the period end...");
    let flipped = store.sweep_expired(purchase + Duration::days(31)).await?;
    println!("   ✓ Sweep marked {} lapsed record(s) expired", flipped);

    // Step 7: A lapsed user can subscribe again
    println!("\n7. user-456 returns after the lapse and resubscribes...");
    let renewed = controller.subscribe(&viewer, "premium", purchase + Duration::days(45)).await?;
    println!("   ✓ New period runs until {}", renewed.period_end);

    let open = count_accessible(&gate, &viewer, purchase + Duration::days(46)).await?;
    println!("   Accessible activities: {}", open);

    println!("\n✓ Subscription lifecycle example complete");
    Ok(())
}

async fn count_accessible(
    gate: &ContentGate,
    viewer: &CurrentUser,
    now: DateTime<Utc>,
) -> Result<usize, GateError> {
    let catalog = gate.browse(viewer, now).await?;
    Ok(catalog.iter().filter(|entry| entry.accessible).count())
}
