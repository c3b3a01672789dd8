//! covid-dash CLI
//!
//! Single entry point for both halves of the system:
//! - Refresh the local store from the feeds, once or on a schedule
//! - Serve the dashboard over the current store
//! - Print a default config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use covid_dash::config::{generate_default_config, Config};
use covid_dash::dashboard::{self, DashboardState};
use covid_dash::ingest::Updater;
use covid_dash::logging;
use covid_dash::snapshot::Snapshot;

#[derive(Parser)]
#[command(name = "covid-dash")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "COVID-19 case and testing dashboard")]
#[command(long_about = "covid-dash refreshes US state and world COVID-19 feeds into a local \
SQLite store\nand serves interactive charts over it.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download both feeds and replace the stored tables
    Update {
        /// Keep running and refresh every N hours
        #[arg(long)]
        every: Option<u64>,
    },

    /// Serve the dashboard
    Serve,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("writing config to {}", path.display()))?;
                println!("Config written to {}", path.display());
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    logging::init(&config.logging, config.dashboard.debug);

    match cli.command {
        Commands::Update { every } => {
            let updater = Updater::from_config(&config).context("building updater")?;
            match every {
                Some(0) => anyhow::bail!("--every must be at least 1 hour"),
                Some(hours) => {
                    updater
                        .run_every(Duration::from_secs(hours * 3600))
                        .await?;
                }
                None => {
                    let report = updater.run().await.context("refreshing feeds")?;
                    println!("{}", report);
                }
            }
        }
        Commands::Serve => {
            let snapshot = Snapshot::load(&config.store.path).with_context(|| {
                format!("loading store {}", config.store.path.display())
            })?;
            let state =
                DashboardState::new(snapshot, &config.dashboard, config.charts.clone())?;
            dashboard::serve(state, &config.dashboard).await?;
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}
