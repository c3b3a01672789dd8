//! Feed Ingestion
//!
//! The updater side of the system: download the state and world CSV feeds,
//! derive the ratio columns and replace the two store tables.
//!
//! - **source**: where feed bodies come from (HTTP, or in-memory for tests)
//! - **feed**: per-feed date handling and derived columns
//! - **updater**: fetch → derive → replace, once or on an interval

mod feed;
mod source;
mod updater;

pub use feed::{Derivation, FeedSpec};
pub use source::{FeedSource, HttpFeedSource, StaticFeedSource};
pub use updater::{TableReport, UpdateReport, Updater};

use crate::store::StoreError;

/// Errors that can occur while refreshing the store
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Timed out fetching {0}")]
    Timeout(String),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Malformed CSV for {table}: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },

    #[error("Feed for {table} is missing expected column {column}")]
    MissingColumn { table: String, column: String },

    #[error("Invalid date {value:?} in {table} at line {line}")]
    InvalidDate {
        table: String,
        line: usize,
        value: String,
    },

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
