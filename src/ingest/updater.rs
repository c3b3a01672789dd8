//! Store refresh
//!
//! Runs every feed through fetch → parse → derive → replace. Feeds are handled
//! one after another and each table replace is its own transaction: a failure
//! on a later feed leaves earlier tables refreshed and the failing one as it
//! was.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use super::{FeedSource, FeedSpec, HttpFeedSource, IngestError};
use crate::config::Config;
use crate::store::TableStore;

/// Outcome for one refreshed table
#[derive(Debug, Clone, PartialEq)]
pub struct TableReport {
    pub table: String,
    pub rows: usize,
    pub columns: usize,
}

/// Outcome of a full refresh
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReport {
    pub store_path: PathBuf,
    pub tables: Vec<TableReport>,
}

impl UpdateReport {
    /// Total rows written across all tables
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

impl fmt::Display for UpdateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.tables.iter().map(|t| t.table.as_str()).collect();
        write!(
            f,
            "new data saved to {} tables at {}",
            names.join(" and "),
            self.store_path.display()
        )
    }
}

/// Refreshes the store from a set of feeds
pub struct Updater {
    source: Arc<dyn FeedSource>,
    store_path: PathBuf,
    feeds: Vec<FeedSpec>,
}

impl Updater {
    pub fn new(
        source: Arc<dyn FeedSource>,
        store_path: impl Into<PathBuf>,
        feeds: Vec<FeedSpec>,
    ) -> Self {
        Self {
            source,
            store_path: store_path.into(),
            feeds,
        }
    }

    /// Updater for the state and world feeds named in `config`, over HTTP
    pub fn from_config(config: &Config) -> Result<Self, IngestError> {
        let source = HttpFeedSource::new(Duration::from_secs(config.feeds.request_timeout_secs))?;
        Ok(Self::new(
            Arc::new(source),
            &config.store.path,
            vec![
                FeedSpec::states(&config.feeds.states_url),
                FeedSpec::world(&config.feeds.world_url),
            ],
        ))
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn feeds(&self) -> &[FeedSpec] {
        &self.feeds
    }

    /// Refresh every table once
    pub async fn run(&self) -> Result<UpdateReport, IngestError> {
        let mut store: Option<TableStore> = None;
        let mut tables = Vec::with_capacity(self.feeds.len());

        for feed in &self.feeds {
            tracing::info!(
                table = %feed.table,
                url = %feed.url,
                source = self.source.name(),
                "Fetching feed"
            );
            let body = self.source.fetch(&feed.url).await?;

            let mut frame = feed.parse(&body)?;
            feed.prepare(&mut frame)?;
            tracing::debug!(table = %feed.table, rows = frame.len(), "Feed prepared");

            // Opened on first use so a failed first fetch leaves no file behind
            if store.is_none() {
                store = Some(TableStore::open(&self.store_path)?);
            }
            if let Some(store) = store.as_mut() {
                let rows = store.replace_table(&feed.table, &frame)?;
                tables.push(TableReport {
                    table: feed.table.clone(),
                    rows,
                    columns: frame.columns().len(),
                });
            }
        }

        let report = UpdateReport {
            store_path: self.store_path.clone(),
            tables,
        };
        tracing::info!("{}", report);
        Ok(report)
    }

    /// Refresh on a fixed interval until Ctrl+C.
    ///
    /// A failed run is logged and the whole refresh is attempted again on the
    /// next tick.
    pub async fn run_every(&self, every: Duration) -> Result<(), IngestError> {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("Refreshing every {:?}", every);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.run().await {
                        Ok(report) => {
                            tracing::info!(rows = report.total_rows(), "Scheduled refresh complete")
                        }
                        Err(e) => tracing::error!(error = %e, "Scheduled refresh failed"),
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping scheduled refresh");
                    return Ok(());
                }
            }
        }
    }
}
