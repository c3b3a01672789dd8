//! Dashboard Snapshot
//!
//! Everything the dashboard reads, loaded once at startup:
//!
//! - **records**: typed rows and the columns each table must provide
//! - **table**: per-key, date-ordered series
//! - **audit**: consistency report on the state table
//!
//! A [`Snapshot`] is never refreshed. Seeing a newer store means restarting
//! the dashboard.
//!
//! # Example
//!
//! ```rust,no_run
//! use covid_dash::snapshot::Snapshot;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let snapshot = Snapshot::load("covid.db")?;
//!     for option in snapshot.state_options() {
//!         println!("{}", option.label);
//!     }
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod records;
pub mod table;

pub use audit::{audit_states, AuditReport, Violation};
pub use records::{Record, StateRecord, TableSchema, WorldRecord};
pub use table::SeriesTable;

use serde::Serialize;
use std::path::Path;

use crate::store::{StoreResult, TableStore};

/// A dropdown entry: what is shown and what is sent back on selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

impl DropdownOption {
    fn same(value: &str) -> Self {
        Self {
            label: value.to_string(),
            value: value.to_string(),
        }
    }
}

/// Both tables, fully in memory
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub states: SeriesTable<StateRecord>,
    pub world: SeriesTable<WorldRecord>,
    audit: AuditReport,
}

impl Snapshot {
    /// Build from already-loaded tables
    pub fn new(states: SeriesTable<StateRecord>, world: SeriesTable<WorldRecord>) -> Self {
        let audit = audit_states(states.records());
        Self {
            states,
            world,
            audit,
        }
    }

    /// Load both tables from the store at `path`.
    ///
    /// A missing store, table or expected column is an error; there is no
    /// empty fallback.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let store = TableStore::open_existing(path)?;
        let states = SeriesTable::load(&store)?;
        let world = SeriesTable::load(&store)?;

        let snapshot = Self::new(states, world);
        snapshot.log_audit();
        Ok(snapshot)
    }

    /// Consistency report computed at construction
    pub fn audit(&self) -> &AuditReport {
        &self.audit
    }

    /// Sorted distinct states
    pub fn state_options(&self) -> Vec<DropdownOption> {
        self.states.keys().map(DropdownOption::same).collect()
    }

    /// Sorted distinct countries
    pub fn country_options(&self) -> Vec<DropdownOption> {
        self.world.keys().map(DropdownOption::same).collect()
    }

    fn log_audit(&self) {
        let audit = &self.audit;
        if audit.is_clean() {
            tracing::info!(rows = audit.rows_checked, "State table consistent");
            return;
        }

        tracing::warn!(
            rows = audit.rows_checked,
            total_mismatches = audit.total_mismatches(),
            ratios_out_of_range = audit.ratios_out_of_range(),
            "State table has inconsistent rows"
        );
        for violation in audit.violations.iter().take(10) {
            tracing::debug!(?violation, "Inconsistent state row");
        }
    }
}
