//! Interface tests for the weaving surfaces using Cucumber.
//!
//! These tests verify the caller-facing dispatch contract and the
//! registry's auto-proxying behavior:
//!
//! ```bash
//! cargo test --test interfaces --features test-utils
//! ```

mod steps;

use cucumber::World;
use steps::dispatch::DispatchWorld;
use steps::registry::RegistryWorld;

#[tokio::main]
async fn main() {
    heddle::telemetry::init_tracing();

    // Run dispatch tests
    println!("\n=== Running Dispatch Interface Tests ===\n");
    DispatchWorld::cucumber()
        .fail_on_skipped()
        .run("tests/interfaces/features/dispatch.feature")
        .await;

    // Run registry tests
    println!("\n=== Running Registry Interface Tests ===\n");
    RegistryWorld::cucumber()
        .fail_on_skipped()
        .run("tests/interfaces/features/registry.feature")
        .await;
}
