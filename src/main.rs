mod cli;
mod config;
mod error;
mod identity;
mod local;
mod model;
mod remote;
mod sync;
mod util;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use local::things::ThingsStore;
use model::report::SyncReport;
use remote::jira::JiraClient;
use remote::IssueSource;
use sync::Reconciler;

// One external call at a time, so a single-threaded runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match run(&cli).await {
        Ok(report) => {
            info!("sync completed successfully: {report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("sync failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<SyncReport> {
    let config = config::load_config(cli.config.as_deref()).context("Failed to load config")?;

    let remote = JiraClient::new(&config)?;
    let local = ThingsStore::new(&config);

    info!(
        "syncing {} ({}) with Things project {:?}{}",
        remote.name(),
        config.jira_url,
        config.things_project,
        if cli.dry_run { " [dry-run]" } else { "" }
    );

    let report = Reconciler::new(&remote, &local, &config)
        .dry_run(cli.dry_run)
        .run(cli.direction)
        .await?;
    Ok(report)
}
