// src/main.rs
use log::info;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use market_stats_sync::config::SyncConfig;
use market_stats_sync::init_logging;
use market_stats_sync::services::pipeline::SyncJob;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    info!("Logger initialized. Starting the market statistics sync service...");

    let config = SyncConfig::from_env()?;
    let job = Arc::new(SyncJob::from_config(&config)?);

    let scheduler = JobScheduler::new().await?;
    let scheduled = job.clone();
    scheduler
        .add(Job::new_async(config.schedule.as_str(), move |_id, _scheduler| {
            let job = scheduled.clone();
            Box::pin(async move {
                job.run_all().await;
            })
        })?)
        .await?;
    scheduler.start().await?;
    info!("Sync scheduled with cron expression {:?} (UTC)", config.schedule);

    if config.run_on_start {
        job.run_all().await;
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    Ok(())
}
