//! Typed table records
//!
//! Each record type carries the schema contract of the table it is read
//! from: the columns the dashboard depends on. Extra feed columns are
//! ignored; a missing one fails the load by name.

use chrono::NaiveDate;
use rusqlite::Row;
use serde::Serialize;

use crate::store::{Cell, StoreError, StoreResult, STATES_TABLE, WORLD_TABLE};

/// Columns a reader needs from one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub table: &'static str,
    /// Column that identifies a series (state or country)
    pub key: &'static str,
    /// Every column read, in the order a record is built from
    pub columns: &'static [&'static str],
}

/// A row type loadable from the store
pub trait Record: Sized {
    const SCHEMA: TableSchema;

    /// Build a record from a row selected with `SCHEMA.columns`
    fn from_row(row: &Row<'_>) -> StoreResult<Self>;

    /// Series key
    fn key(&self) -> &str;

    fn date(&self) -> NaiveDate;
}

/// One US state on one day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateRecord {
    pub state: String,
    pub date: NaiveDate,
    pub positive: Option<f64>,
    pub negative: Option<f64>,
    pub total_tests: Option<f64>,
    pub pos_per_tests: Option<f64>,
}

impl Record for StateRecord {
    const SCHEMA: TableSchema = TableSchema {
        table: STATES_TABLE,
        key: "state",
        columns: &[
            "state",
            "date",
            "positive",
            "negative",
            "total_tests",
            "pos_per_tests",
        ],
    };

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        let r = RowReader::<Self>::new(row);
        Ok(Self {
            state: r.text(0)?,
            date: r.date(1)?,
            positive: r.number(2)?,
            negative: r.number(3)?,
            total_tests: r.number(4)?,
            pos_per_tests: r.number(5)?,
        })
    }

    fn key(&self) -> &str {
        &self.state
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// One country on one day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldRecord {
    pub location: String,
    pub date: NaiveDate,
    pub new_cases: Option<f64>,
    pub new_deaths: Option<f64>,
    pub new_tests: Option<f64>,
    /// Population-scaled by the feed itself
    pub new_cases_per_million: Option<f64>,
    /// Stored by the updater; no chart reads it
    pub deaths_per_pos: Option<f64>,
    pub pos_per_tests: Option<f64>,
}

impl Record for WorldRecord {
    const SCHEMA: TableSchema = TableSchema {
        table: WORLD_TABLE,
        key: "location",
        columns: &[
            "location",
            "date",
            "new_cases",
            "new_deaths",
            "new_tests",
            "new_cases_per_million",
            "deaths_per_pos",
            "pos_per_tests",
        ],
    };

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        let r = RowReader::<Self>::new(row);
        Ok(Self {
            location: r.text(0)?,
            date: r.date(1)?,
            new_cases: r.number(2)?,
            new_deaths: r.number(3)?,
            new_tests: r.number(4)?,
            new_cases_per_million: r.number(5)?,
            deaths_per_pos: r.number(6)?,
            pos_per_tests: r.number(7)?,
        })
    }

    fn key(&self) -> &str {
        &self.location
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Cell access with errors naming the table and column
struct RowReader<'r, 's, R> {
    row: &'r Row<'s>,
    _record: std::marker::PhantomData<R>,
}

impl<'r, 's, R: Record> RowReader<'r, 's, R> {
    fn new(row: &'r Row<'s>) -> Self {
        Self {
            row,
            _record: std::marker::PhantomData,
        }
    }

    fn invalid(&self, idx: usize, message: String) -> StoreError {
        StoreError::InvalidValue {
            table: R::SCHEMA.table.to_string(),
            column: R::SCHEMA.columns[idx].to_string(),
            message,
        }
    }

    fn cell(&self, idx: usize) -> StoreResult<Cell> {
        Ok(self.row.get::<_, Cell>(idx)?)
    }

    fn text(&self, idx: usize) -> StoreResult<String> {
        match self.cell(idx)? {
            Cell::Text(s) => Ok(s),
            Cell::Integer(i) => Ok(i.to_string()),
            Cell::Real(f) => Ok(f.to_string()),
            Cell::Null => Err(self.invalid(idx, "missing key".to_string())),
        }
    }

    fn date(&self, idx: usize) -> StoreResult<NaiveDate> {
        let raw = self.text(idx)?;
        // Accept a trailing time component on otherwise ISO dates
        let day = raw.get(..10).unwrap_or(raw.as_str());
        NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map_err(|e| self.invalid(idx, format!("{:?}: {}", raw, e)))
    }

    fn number(&self, idx: usize) -> StoreResult<Option<f64>> {
        match self.cell(idx)? {
            Cell::Null => Ok(None),
            Cell::Integer(i) => Ok(Some(i as f64)),
            Cell::Real(f) => Ok(Some(f)),
            Cell::Text(s) if s.trim().is_empty() => Ok(None),
            Cell::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(|f| Some(f).filter(|f| f.is_finite()))
                .map_err(|_| self.invalid(idx, format!("{:?} is not a number", s))),
        }
    }
}
