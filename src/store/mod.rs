//! Table Store
//!
//! The relational side of the system:
//!
//! - **frame**: untyped feed data with inferred column kinds
//! - **sqlite**: SQLite-backed store with whole-table replace and full scans
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use covid_dash::store::{Frame, TableStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let frame = Frame::from_csv_str("state,date,positive\nOH,2020-03-01,100")?;
//!
//!     let mut store = TableStore::open("covid.db")?;
//!     store.replace_table("covid_states", &frame)?;
//!
//!     let rows = store.dump("covid_states")?;
//!     println!("{} rows", rows.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod frame;
pub mod sqlite;

pub use error::{StoreError, StoreResult};
pub use frame::{Cell, Column, ColumnKind, Frame};
pub use sqlite::TableStore;

/// Table holding one row per US state per day
pub const STATES_TABLE: &str = "covid_states";

/// Table holding one row per country per day
pub const WORLD_TABLE: &str = "covid_world";
