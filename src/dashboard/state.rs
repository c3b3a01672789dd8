//! Dashboard State
//!
//! Shared state accessible by all handlers. Everything in here is built at
//! startup and read-only afterwards, so handlers share it without locking.

use std::sync::Arc;
use std::time::Instant;

use super::error::DashboardResult;
use super::page;
use crate::config::{ChartConfig, DashboardConfig};
use crate::snapshot::Snapshot;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct DashboardState {
    /// Both tables as loaded at startup
    pub snapshot: Arc<Snapshot>,
    /// Palette, axis and reference-line settings
    pub charts: Arc<ChartConfig>,
    /// The rendered page
    pub page: Arc<str>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl DashboardState {
    /// Build state and render the page from a loaded snapshot
    pub fn new(
        snapshot: Snapshot,
        dashboard: &DashboardConfig,
        charts: ChartConfig,
    ) -> DashboardResult<Self> {
        let page = page::render(&snapshot, dashboard)?;
        Ok(Self {
            snapshot: Arc::new(snapshot),
            charts: Arc::new(charts),
            page: Arc::from(page),
            start_time: Instant::now(),
        })
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
