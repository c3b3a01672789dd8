//! In-memory series table
//!
//! Records grouped by series key, each group sorted by date. Built once and
//! never mutated, so request handlers can share it freely.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::records::Record;
use crate::store::{StoreResult, TableStore};

/// Read-only table of records indexed by key and date
#[derive(Debug, Clone)]
pub struct SeriesTable<R> {
    by_key: BTreeMap<String, Vec<R>>,
    latest: Option<NaiveDate>,
    rows: usize,
}

impl<R: Record> SeriesTable<R> {
    /// Group records by key. Within a key, records keep feed order for equal
    /// dates.
    pub fn from_records(records: impl IntoIterator<Item = R>) -> Self {
        let mut by_key: BTreeMap<String, Vec<R>> = BTreeMap::new();
        let mut latest: Option<NaiveDate> = None;
        let mut rows = 0;

        for record in records {
            rows += 1;
            let date = record.date();
            latest = Some(latest.map_or(date, |l| l.max(date)));
            by_key.entry(record.key().to_string()).or_default().push(record);
        }

        for series in by_key.values_mut() {
            series.sort_by_key(|r| r.date());
        }

        Self {
            by_key,
            latest,
            rows,
        }
    }

    /// Full scan of the record's table
    pub fn load(store: &TableStore) -> StoreResult<Self> {
        let schema = R::SCHEMA;
        let records = store.scan(schema.table, schema.columns, |row| R::from_row(row))?;
        tracing::info!(table = schema.table, rows = records.len(), "Table loaded");
        Ok(Self::from_records(records))
    }

    /// Distinct keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_key.keys().map(String::as_str)
    }

    /// Date-ordered records for one key; empty for an unknown key
    pub fn series(&self, key: &str) -> &[R] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every record, grouped by key
    pub fn records(&self) -> impl Iterator<Item = &R> + '_ {
        self.by_key.values().flatten()
    }

    /// Latest date anywhere in the table
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.latest
    }

    /// Total rows loaded
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}
