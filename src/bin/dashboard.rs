//! covid-dash Dashboard Server
//!
//! Run with: cargo run --bin covid-dashboard
//!
//! Loads the store once at startup. Run the updater and restart to pick up
//! new data.
//!
//! # Configuration
//!
//! Read from the standard config locations, then environment variables:
//! - `COVID_DASH_STORE_PATH`: Store path (default: covid.db)
//! - `COVID_DASH_HOST`: Host to bind to (default: 0.0.0.0)
//! - `COVID_DASH_PORT`: Port to listen on (default: 8051)
//! - `COVID_DASH_LOG_LEVEL`: Log level (default: info)
//! - `RUST_LOG`: Log filter (default: covid_dash=info)

use anyhow::Context;

use covid_dash::config::Config;
use covid_dash::dashboard::{serve, DashboardState};
use covid_dash::logging;
use covid_dash::snapshot::Snapshot;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    logging::init(&config.logging, config.dashboard.debug);

    tracing::info!("Starting covid-dash dashboard v{}", env!("CARGO_PKG_VERSION"));

    let snapshot = Snapshot::load(&config.store.path)
        .with_context(|| format!("loading store {}", config.store.path.display()))?;
    tracing::info!(
        states = snapshot.states.keys().count(),
        countries = snapshot.world.keys().count(),
        "Snapshot loaded"
    );

    let state = DashboardState::new(snapshot, &config.dashboard, config.charts.clone())?;
    serve(state, &config.dashboard).await?;

    Ok(())
}
