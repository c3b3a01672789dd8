//! covid-dash Updater
//!
//! Run with: cargo run --bin covid-updater
//!
//! Downloads both feeds once and replaces the stored tables.
//!
//! # Configuration
//!
//! Read from the standard config locations, then environment variables:
//! - `COVID_DASH_STORE_PATH`: Store path (default: covid.db)
//! - `COVID_DASH_STATES_URL`: US state daily feed
//! - `COVID_DASH_WORLD_URL`: World feed
//! - `RUST_LOG`: Log filter (default: covid_dash=info)

use anyhow::Context;

use covid_dash::config::Config;
use covid_dash::ingest::Updater;
use covid_dash::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    logging::init(&config.logging, false);

    tracing::info!("Starting covid-dash updater v{}", env!("CARGO_PKG_VERSION"));

    let updater = Updater::from_config(&config).context("building updater")?;
    let report = updater.run().await.context("refreshing feeds")?;

    println!("{}", report);
    Ok(())
}
