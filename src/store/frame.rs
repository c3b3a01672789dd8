//! Untyped tabular data
//!
//! A [`Frame`] is the in-memory form of a downloaded feed: ordered named
//! columns, each with a SQL kind inferred from its cells, and rows of
//! [`Cell`] values. The store writes a frame's columns verbatim as the table
//! schema, so whatever columns the feed carries end up in the table.

use std::io::Read;

/// A single cell value after type coercion
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    /// Build a real cell, mapping non-finite results to `Null`
    pub fn real(value: f64) -> Self {
        if value.is_finite() {
            Cell::Real(value)
        } else {
            Cell::Null
        }
    }

    /// Numeric view of the cell; text and null cells have none
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(i) => Some(*i as f64),
            Cell::Real(f) => Some(*f),
            Cell::Null | Cell::Text(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Textual view used when a column is coerced to text
    fn into_text(self) -> Cell {
        match self {
            Cell::Integer(i) => Cell::Text(i.to_string()),
            Cell::Real(f) => Cell::Text(f.to_string()),
            other => other,
        }
    }
}

/// SQL storage kind of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
}

impl ColumnKind {
    /// Column type used in `CREATE TABLE`
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Real => "REAL",
            ColumnKind::Text => "TEXT",
        }
    }

    /// Infer the narrowest kind that holds every non-null cell.
    ///
    /// A column with no values at all is `Real`, matching a column of
    /// undefined numbers.
    pub fn infer<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Self {
        let mut kind: Option<ColumnKind> = None;
        for cell in cells {
            let cell_kind = match cell {
                Cell::Null => continue,
                Cell::Integer(_) => ColumnKind::Integer,
                Cell::Real(_) => ColumnKind::Real,
                Cell::Text(_) => return ColumnKind::Text,
            };
            kind = Some(match (kind, cell_kind) {
                (None, k) => k,
                (Some(ColumnKind::Integer), ColumnKind::Integer) => ColumnKind::Integer,
                _ => ColumnKind::Real,
            });
        }
        kind.unwrap_or(ColumnKind::Real)
    }
}

/// A named, typed column header
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// Row-oriented table with inferred column kinds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
}

impl Frame {
    /// Parse CSV with a header row.
    ///
    /// Every field is coerced on its own (empty → null, integer, real, text)
    /// and then each column is widened to a single kind. Rows with a field
    /// count different from the header are rejected.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let names: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(parse_field).collect::<Vec<_>>());
        }

        let mut frame = Frame {
            columns: Vec::with_capacity(names.len()),
            rows,
        };
        for (idx, name) in names.into_iter().enumerate() {
            let kind = ColumnKind::infer(frame.rows.iter().map(|r| &r[idx]));
            frame.columns.push(Column { name, kind });
            frame.normalize_column(idx);
        }

        Ok(frame)
    }

    /// Parse CSV from an in-memory string
    pub fn from_csv_str(data: &str) -> Result<Self, csv::Error> {
        Self::from_csv_reader(data.as_bytes())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Cells of one column, in row order
    pub fn column_cells(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Replace a column's cells, or append it when absent. The column kind is
    /// re-inferred from the new cells.
    ///
    /// # Panics
    ///
    /// Panics if `cells` does not have one entry per row.
    pub fn set_column(&mut self, name: &str, cells: Vec<Cell>) {
        assert_eq!(cells.len(), self.rows.len(), "column length must match row count");

        let kind = ColumnKind::infer(cells.iter());
        let idx = match self.column_index(name) {
            Some(idx) => {
                self.columns[idx].kind = kind;
                for (row, cell) in self.rows.iter_mut().zip(cells) {
                    row[idx] = cell;
                }
                idx
            }
            None => {
                self.columns.push(Column {
                    name: name.to_string(),
                    kind,
                });
                for (row, cell) in self.rows.iter_mut().zip(cells) {
                    row.push(cell);
                }
                self.columns.len() - 1
            }
        };
        self.normalize_column(idx);
    }

    /// Bring every cell of a column in line with the column kind
    fn normalize_column(&mut self, idx: usize) {
        let kind = self.columns[idx].kind;
        for row in &mut self.rows {
            let cell = std::mem::replace(&mut row[idx], Cell::Null);
            row[idx] = match (kind, cell) {
                (ColumnKind::Text, cell) => cell.into_text(),
                (ColumnKind::Real, Cell::Integer(i)) => Cell::Real(i as f64),
                (_, cell) => cell,
            };
        }
    }
}

fn parse_field(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cell::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Cell::Integer(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return Cell::real(f);
    }
    Cell::Text(trimmed.to_string())
}
