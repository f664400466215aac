// # Google Cloud DNS Real Environment Validation Tool
//
// Exercises the Google Cloud provider through the engine against a real
// project: zone lookup, record lookup, create, and the idempotent re-run.
//
// ## Usage
//
// ```bash
// # Dry-run mode (default - safe)
// ZONECTL_MODE=dry-run \
// GOOGLE_CLOUD_PROJECT=my-project \
// ZONECTL_ACCESS_TOKEN="$(gcloud auth print-access-token)" \
// ZONECTL_ZONE=test.example.com \
// ZONECTL_RECORD_NAME=zonectl-test.test.example.com \
// ZONECTL_TEST_VALUE=192.0.2.1 \
// cargo run -p zonectl-demos --bin gcloud_validation
//
// # Live mode (makes actual changes!)
// ZONECTL_MODE=live ... cargo run -p zonectl-demos --bin gcloud_validation
// ```
//
// ## Environment Variables
//
// Required:
// - `GOOGLE_CLOUD_PROJECT`: Project owning the managed zone
// - `ZONECTL_ACCESS_TOKEN`: OAuth2 access token
// - `ZONECTL_ZONE`: Zone domain (must already exist)
// - `ZONECTL_RECORD_NAME`: Full record name
// - `ZONECTL_TEST_VALUE`: Record value
//
// Optional:
// - `ZONECTL_RECORD_TYPE`: Record type (default: A)
// - `ZONECTL_MODE`: "dry-run" or "live" (default: dry-run)

use std::env;

use zonectl_core::{Engine, EngineConfig, RecordRequest};
use zonectl_provider_gcloud::GoogleCloudDnsProvider;

fn required(name: &str) -> Result<String, Box<dyn std::error::Error>> {
    env::var(name).map_err(|_| format!("{} environment variable is required", name).into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("=== Google Cloud DNS Provider Real Environment Validation ===");

    let project_id = required("GOOGLE_CLOUD_PROJECT")?;
    let access_token = required("ZONECTL_ACCESS_TOKEN")?;
    let zone = required("ZONECTL_ZONE")?;
    let record_name = required("ZONECTL_RECORD_NAME")?;
    let value = required("ZONECTL_TEST_VALUE")?;
    let record_type = env::var("ZONECTL_RECORD_TYPE").unwrap_or_else(|_| "A".to_string());

    let mode = env::var("ZONECTL_MODE").unwrap_or_else(|_| "dry-run".to_string());
    let dry_run = mode.to_lowercase() == "dry-run";

    if dry_run {
        tracing::warn!("Running in DRY-RUN mode - no changes will be made");
    } else {
        tracing::warn!("Running in LIVE mode - will make actual DNS changes!");
    }

    tracing::info!("Configuration:");
    tracing::info!("  Project: {}", project_id);
    tracing::info!("  Zone: {}", zone);
    tracing::info!("  Record: {} {} {}", record_name, record_type, value);
    tracing::info!("  Mode: {}", mode);

    tracing::info!("--- Step 1: Creating Google Cloud DNS Provider ---");
    let provider = GoogleCloudDnsProvider::new(project_id, access_token)?;
    tracing::info!("Provider created: {:?}", provider);

    let engine = Engine::new(Box::new(provider), EngineConfig { dry_run });
    let request = RecordRequest::new(record_name, zone, record_type).with_values([value]);

    tracing::info!("--- Step 2: Reconciling Record ---");
    let first = engine.reconcile_record(&request).await;
    println!("{}", serde_json::to_string_pretty(&first)?);
    if first.failed() {
        return Err(format!(
            "Reconciliation failed: {}",
            first.outcome.msg.unwrap_or_default()
        )
        .into());
    }

    if dry_run {
        tracing::info!("=== DRY-RUN COMPLETE ===");
        tracing::info!("No changes were made. To make actual changes, set ZONECTL_MODE=live");
        return Ok(());
    }

    tracing::info!("--- Step 3: Testing Idempotency ---");
    let second = engine.reconcile_record(&request).await;
    println!("{}", serde_json::to_string_pretty(&second)?);
    if second.changed() || second.failed() {
        tracing::warn!("Second run was not a no-op (may indicate an idempotency issue)");
    } else {
        tracing::info!("Idempotency verified (unchanged as expected)");
    }

    tracing::info!("=== LIVE MODE COMPLETE ===");
    Ok(())
}
