//! Gated catalog browsing example.
//!
//! This example shows how the same activity catalog renders for an
//! anonymous visitor and for a subscriber, using fully in-process
//! backends so it runs offline.
//!
//! # Running this example
//!
//! ```bash
//! cargo run --example browse_catalog
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
    CurrentUser,
    activities::{Activity, StaticActivityDirectory},
    catalog::{BuiltinPlanCatalog, PlanCatalog},
    entitlement::EntitlementEvaluator,
    gate::{ContentGate, GatedActivity},
    lifecycle::SubscriptionController,
    subscription::{MemoryRecordStore, SubscriptionStore, UserId},
};
use chrono::Utc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Activity Gate: Browse Catalog Example\n");

    // Step 1: Wire in-process backends
    println!("1. Wiring in-process backends...");
    let plans: Arc<dyn PlanCatalog> = Arc::new(BuiltinPlanCatalog::new());
    let store = SubscriptionStore::new(Arc::new(MemoryRecordStore::new()), Arc::clone(&plans));
    let controller = SubscriptionController::new(Arc::clone(&plans), store.clone());
    let directory = Arc::new(StaticActivityDirectory::new(vec![
        Activity::new("volcano-1", "Baking Soda Volcano").with_category("science"),
        Activity::new("paper-crane", "Origami Paper Crane").with_category("crafts"),
        Activity::new("star-map", "Backyard Star Map").with_category("science"),
    ]));
    let gate = ContentGate::new(directory, EntitlementEvaluator::new(store));
    println!("   ✓ Gate ready");

    // Step 2: Show the purchasable plans
    println!("\n2. Available plans:");
    for plan in plans.list_plans().await? {
        println!("   {} - {} {} per {}", plan.name, plan.price, plan.currency, plan.period);
    }

    // Step 3: Browse as an anonymous visitor
    println!("\n3. Browsing as an anonymous visitor...");
    let catalog = gate.browse(&CurrentUser::Anonymous, Utc::now()).await?;
    print_catalog(&catalog);
    println!("   Every activity is listed, none may be opened.");

    // Step 4: Subscribe a signed-in user
    println!("\n4. Subscribing user-456 to the premium plan...");
    let viewer = CurrentUser::SignedIn(UserId::new("user-456")?);
    let record = controller.subscribe(&viewer, "premium", Utc::now()).await?;
    println!("   ✓ Subscribed until {}", record.period_end);

    // Step 5: Browse as the subscriber
    println!("\n5. Browsing as the subscriber...");
    let catalog = gate.browse(&viewer, Utc::now()).await?;
    print_catalog(&catalog);
    println!("   The whole catalog unlocked at once.");

    println!("\n✓ Browse catalog example complete");
    Ok(())
}

fn print_catalog(catalog: &[GatedActivity]) {
    for entry in catalog {
        let marker = if entry.accessible { "open  " } else { "locked" };
        println!("   [{}] {} ({})", marker, entry.activity.title, entry.activity.category);
    }
}
