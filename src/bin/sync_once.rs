// src/bin/sync_once.rs
// Run with: cargo run --bin sync_once -- [bond] [set] [mai]

use log::info;
use std::env;
use std::process::ExitCode;

use market_stats_sync::config::SyncConfig;
use market_stats_sync::init_logging;
use market_stats_sync::services::pipeline::{any_failed, FamilyKind, SyncJob};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_logging();

    let kinds = env::args()
        .skip(1)
        .map(|arg| arg.parse::<FamilyKind>())
        .collect::<Result<Vec<_>, _>>()?;
    let kinds = if kinds.is_empty() { FamilyKind::ALL.to_vec() } else { kinds };

    let config = SyncConfig::from_env()?;
    let job = SyncJob::from_config(&config)?;

    let results = job.run_kinds(&kinds).await;
    for (kind, result) in &results {
        if let Ok(report) = result {
            info!("{}: {:?}", kind, report);
        }
    }

    if any_failed(&results) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
