use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use dropwatch::config::AppConfig;
use dropwatch::db::SqliteRepository;
use dropwatch::monitor::PriceMonitor;
use dropwatch::notifiers::SmtpNotifier;
use dropwatch::scheduler::{shutdown_channel, Scheduler};
use dropwatch::sources::HttpPriceSource;

#[derive(Debug, Parser)]
#[command(name = "dropwatch", about = "Price-drop tracking service with email alerts")]
struct Cli {
    /// Run exactly one sweep and exit instead of entering the scheduler loop
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dropwatch=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let repo = Arc::new(SqliteRepository::connect(&config.database).await?);
    let source = Arc::new(HttpPriceSource::new(&config.fetcher)?);
    let notifier = Arc::new(SmtpNotifier::new(&config.smtp)?);

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let mut monitor = PriceMonitor::new(
        repo,
        source,
        notifier,
        config.monitor.clone(),
        shutdown_rx.clone(),
    );

    if cli.once {
        let summary = monitor.run_sweep().await?;
        info!(?summary, "single sweep finished");
        return Ok(());
    }

    let scheduler = Scheduler::new(
        monitor,
        Duration::from_secs(config.monitor.sweep_interval_secs),
        shutdown_rx,
    );
    let scheduler_handle = tokio::spawn(scheduler.run());

    info!("Starting Dropwatch...");
    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    let _ = shutdown_tx.send(true);
    scheduler_handle.await?;

    Ok(())
}
