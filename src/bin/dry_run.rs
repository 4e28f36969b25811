// src/bin/dry_run.rs
// Run with: cargo run --bin dry_run
//
// Fetches every family against an empty in-memory store and prints what would be appended.

use std::sync::Arc;
use std::time::Duration;

use market_stats_sync::init_logging;
use market_stats_sync::services::clock::SystemClock;
use market_stats_sync::services::db::MemoryStore;
use market_stats_sync::services::fetch::HttpFetcher;
use market_stats_sync::services::pipeline::{FamilyKind, Sources, SyncJob};
use market_stats_sync::services::sync::AppendOutcome;

fn describe(outcome: &AppendOutcome) -> String {
    match outcome {
        AppendOutcome::Inserted(n) => format!("{} rows", n),
        AppendOutcome::NoNewData => "no rows".to_string(),
        AppendOutcome::Failed(reason) => format!("failed ({})", reason),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let job = SyncJob::new(
        Arc::new(HttpFetcher::new(Duration::from_secs(30))?),
        Arc::new(MemoryStore::new()),
        Arc::new(SystemClock),
        Sources::default(),
    );

    for (kind, result) in job.run_kinds(&FamilyKind::ALL).await {
        match result {
            Ok(report) => {
                println!("{:<5} {:<18} {}", kind, report.family, describe(&report.primary));
                if let Some(derived) = &report.derived {
                    println!("{:<5} {:<18} {}", kind, "returns", describe(derived));
                }
            }
            Err(e) => println!("{:<5} error: {}", kind, e),
        }
    }
    Ok(())
}
