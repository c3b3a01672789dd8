//! # covid-dash
//!
//! COVID-19 case and testing dashboard. An updater pulls the US state and
//! world feeds into a local SQLite store; the dashboard loads that store once
//! and serves three interactive charts.
//!
//! ## Modules
//!
//! - [`store`]: in-memory frames and the SQLite table store
//! - [`ingest`]: feed download, date normalization, derived columns
//! - [`snapshot`]: typed, per-key series loaded for the dashboard
//! - [`charts`]: figure JSON for each chart
//! - [`dashboard`]: HTTP server with Axum
//! - [`config`]: TOML configuration with environment overrides
//! - [`logging`]: `tracing` subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use covid_dash::config::Config;
//! use covid_dash::ingest::Updater;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let report = Updater::from_config(&config)?.run().await?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod ingest;
pub mod logging;
pub mod snapshot;
pub mod store;

// Re-export top-level types for convenience
pub use store::{Cell, Column, ColumnKind, Frame, StoreError, StoreResult, TableStore};

pub use ingest::{
    Derivation, FeedSource, FeedSpec, HttpFeedSource, IngestError, StaticFeedSource, UpdateReport,
    Updater,
};

pub use snapshot::{AuditReport, DropdownOption, SeriesTable, Snapshot, StateRecord, WorldRecord};

pub use charts::{ChartId, Figure};

pub use dashboard::{build_router, serve, DashboardError, DashboardState};

pub use config::{
    ChartConfig, Config, ConfigError, DashboardConfig, FeedsConfig, LoggingConfig, StoreConfig,
};
