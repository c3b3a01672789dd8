//! Store error types
//!
//! Defines all errors that can occur in the table store.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the table store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store file does not exist (read-only open)
    #[error("Store not found at {0:?}")]
    NotFound(PathBuf),

    /// Requested table does not exist
    #[error("Table not found: {0}")]
    TableMissing(String),

    /// Table exists but lacks a column the reader depends on
    #[error("Table {table} is missing expected column {column}")]
    MissingColumn { table: String, column: String },

    /// A stored value could not be coerced into the expected type
    #[error("Invalid value in {table}.{column}: {message}")]
    InvalidValue {
        table: String,
        column: String,
        message: String,
    },

    /// A table must have at least one column
    #[error("Cannot create table {0} without columns")]
    EmptySchema(String),

    /// Table or column name unusable as a SQL identifier
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// SQLite reported an error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
