//! Feed definitions
//!
//! A [`FeedSpec`] names the table a feed lands in, how its date column is
//! written, and which columns are derived from it before storage.

use chrono::NaiveDate;

use super::IngestError;
use crate::snapshot::{Record, StateRecord, WorldRecord};
use crate::store::{Cell, Frame};

/// Date format written to the store
pub const STORED_DATE_FORMAT: &str = "%Y-%m-%d";

/// A column computed from two existing columns of the same row
#[derive(Debug, Clone, PartialEq)]
pub enum Derivation {
    /// `output = left + right`; undefined if either side is missing
    Sum {
        output: String,
        left: String,
        right: String,
    },
    /// `output = numerator / denominator`; undefined on a zero or missing
    /// denominator and on a missing numerator
    Ratio {
        output: String,
        numerator: String,
        denominator: String,
    },
}

impl Derivation {
    pub fn sum(output: &str, left: &str, right: &str) -> Self {
        Derivation::Sum {
            output: output.to_string(),
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    pub fn ratio(output: &str, numerator: &str, denominator: &str) -> Self {
        Derivation::Ratio {
            output: output.to_string(),
            numerator: numerator.to_string(),
            denominator: denominator.to_string(),
        }
    }

    /// Name of the column this derivation writes
    pub fn output(&self) -> &str {
        match self {
            Derivation::Sum { output, .. } | Derivation::Ratio { output, .. } => output,
        }
    }

    /// Names of the columns this derivation reads
    pub fn inputs(&self) -> [&str; 2] {
        match self {
            Derivation::Sum { left, right, .. } => [left.as_str(), right.as_str()],
            Derivation::Ratio {
                numerator,
                denominator,
                ..
            } => [numerator.as_str(), denominator.as_str()],
        }
    }

    fn apply(&self, lhs: &Cell, rhs: &Cell) -> Cell {
        match self {
            Derivation::Sum { .. } => match (lhs, rhs) {
                (Cell::Integer(a), Cell::Integer(b)) => a
                    .checked_add(*b)
                    .map(Cell::Integer)
                    .unwrap_or_else(|| Cell::real(*a as f64 + *b as f64)),
                _ => match (lhs.as_f64(), rhs.as_f64()) {
                    (Some(a), Some(b)) => Cell::real(a + b),
                    _ => Cell::Null,
                },
            },
            Derivation::Ratio { .. } => match (lhs.as_f64(), rhs.as_f64()) {
                (Some(n), Some(d)) if d != 0.0 => Cell::real(n / d),
                _ => Cell::Null,
            },
        }
    }

    /// Compute the output column for every row of `frame`
    fn compute(&self, frame: &Frame) -> Vec<Cell> {
        let [left, right] = self.inputs();
        // Presence is checked by FeedSpec::check_columns before any derivation runs
        let (Some(li), Some(ri)) = (frame.column_index(left), frame.column_index(right)) else {
            return vec![Cell::Null; frame.len()];
        };
        frame
            .rows()
            .iter()
            .map(|row| self.apply(&row[li], &row[ri]))
            .collect()
    }
}

/// One remote CSV feed and its target table
#[derive(Debug, Clone)]
pub struct FeedSpec {
    pub table: String,
    pub url: String,
    pub date_column: String,
    /// strftime format of the feed's date column
    pub date_format: String,
    /// Applied in order; later derivations may read earlier outputs
    pub derivations: Vec<Derivation>,
    /// Columns the dashboard reads from the stored table
    pub record_columns: Vec<String>,
}

impl FeedSpec {
    /// Daily per-state testing feed
    pub fn states(url: impl Into<String>) -> Self {
        Self::for_record::<StateRecord>(
            url,
            "%Y%m%d",
            vec![
                Derivation::sum("total_tests", "positive", "negative"),
                Derivation::ratio("pos_per_tests", "positive", "total_tests"),
            ],
        )
    }

    /// Daily per-country case feed
    pub fn world(url: impl Into<String>) -> Self {
        Self::for_record::<WorldRecord>(
            url,
            STORED_DATE_FORMAT,
            vec![
                Derivation::ratio("deaths_per_pos", "new_deaths", "new_cases"),
                Derivation::ratio("pos_per_tests", "new_cases", "new_tests"),
            ],
        )
    }

    /// Feed landing in the table `R` is loaded from
    fn for_record<R: Record>(
        url: impl Into<String>,
        date_format: &str,
        derivations: Vec<Derivation>,
    ) -> Self {
        let schema = R::SCHEMA;
        Self {
            table: schema.table.to_string(),
            url: url.into(),
            date_column: "date".to_string(),
            date_format: date_format.to_string(),
            derivations,
            record_columns: schema.columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Columns the feed itself must carry: the date, every derivation input
    /// and every column the dashboard reads, minus derived outputs
    pub fn required_columns(&self) -> Vec<&str> {
        let mut required = vec![self.date_column.as_str()];
        let mut produced: Vec<&str> = Vec::new();
        for derivation in &self.derivations {
            for input in derivation.inputs() {
                if !produced.contains(&input) && !required.contains(&input) {
                    required.push(input);
                }
            }
            produced.push(derivation.output());
        }
        for column in &self.record_columns {
            let column = column.as_str();
            if !produced.contains(&column) && !required.contains(&column) {
                required.push(column);
            }
        }
        required
    }

    /// Parse a downloaded body into a frame
    pub fn parse(&self, body: &str) -> Result<Frame, IngestError> {
        Frame::from_csv_str(body).map_err(|source| IngestError::Csv {
            table: self.table.clone(),
            source,
        })
    }

    /// Rewrite dates to the stored format and add derived columns
    pub fn prepare(&self, frame: &mut Frame) -> Result<(), IngestError> {
        self.check_columns(frame)?;
        self.normalize_dates(frame)?;

        for derivation in &self.derivations {
            let cells = derivation.compute(frame);
            frame.set_column(derivation.output(), cells);
        }

        Ok(())
    }

    fn check_columns(&self, frame: &Frame) -> Result<(), IngestError> {
        match self
            .required_columns()
            .into_iter()
            .find(|column| frame.column_index(column).is_none())
        {
            Some(column) => Err(IngestError::MissingColumn {
                table: self.table.clone(),
                column: column.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn normalize_dates(&self, frame: &mut Frame) -> Result<(), IngestError> {
        let cells = frame
            .column_cells(&self.date_column)
            .ok_or_else(|| IngestError::MissingColumn {
                table: self.table.clone(),
                column: self.date_column.clone(),
            })?;

        let mut dates = Vec::with_capacity(frame.len());
        for (idx, cell) in cells.enumerate() {
            let raw = match cell {
                Cell::Integer(i) => i.to_string(),
                Cell::Real(f) => f.to_string(),
                Cell::Text(s) => s.trim().to_string(),
                Cell::Null => String::new(),
            };
            let date = NaiveDate::parse_from_str(&raw, &self.date_format).map_err(|_| {
                IngestError::InvalidDate {
                    table: self.table.clone(),
                    // header is line 1
                    line: idx + 2,
                    value: raw.clone(),
                }
            })?;
            dates.push(Cell::Text(date.format(STORED_DATE_FORMAT).to_string()));
        }

        frame.set_column(&self.date_column, dates);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ColumnKind;

    fn cell<'a>(frame: &'a Frame, row: usize, column: &str) -> &'a Cell {
        &frame.rows()[row][frame.column_index(column).unwrap()]
    }

    #[test]
    fn test_states_derivations() {
        let feed = FeedSpec::states("mem://states");
        let mut frame = feed
            .parse(
                "date,state,positive,negative
20200301,OH,100,900
20200301,NH,0,0
20200302,MA,5,",
            )
            .unwrap();
        feed.prepare(&mut frame).unwrap();

        assert_eq!(cell(&frame, 0, "date"), &Cell::Text("2020-03-01".into()));
        assert_eq!(cell(&frame, 0, "total_tests"), &Cell::Integer(1000));
        assert_eq!(cell(&frame, 0, "pos_per_tests"), &Cell::Real(0.1));

        // zero denominator
        assert_eq!(cell(&frame, 1, "total_tests"), &Cell::Integer(0));
        assert_eq!(cell(&frame, 1, "pos_per_tests"), &Cell::Null);

        // missing operand
        assert_eq!(cell(&frame, 2, "total_tests"), &Cell::Null);
        assert_eq!(cell(&frame, 2, "pos_per_tests"), &Cell::Null);

        let date_kind = frame.columns()[frame.column_index("date").unwrap()].kind;
        assert_eq!(date_kind, ColumnKind::Text);
    }

    #[test]
    fn test_world_derivations() {
        let feed = FeedSpec::world("mem://world");
        let mut frame = feed
            .parse(
                "location,date,new_cases,new_deaths,new_tests,new_cases_per_million
Hungary,2020-03-01,10,1,200,1.035
Hungary,2020-03-02,0,0,,0",
            )
            .unwrap();
        feed.prepare(&mut frame).unwrap();

        assert_eq!(cell(&frame, 0, "deaths_per_pos"), &Cell::Real(0.1));
        assert_eq!(cell(&frame, 0, "pos_per_tests"), &Cell::Real(0.05));
        assert_eq!(cell(&frame, 1, "deaths_per_pos"), &Cell::Null);
        assert_eq!(cell(&frame, 1, "pos_per_tests"), &Cell::Null);
        assert_eq!(frame.columns().len(), 8);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let feed = FeedSpec::states("mem://states");
        let mut frame = feed.parse("date,state,positive\n20200301,OH,1").unwrap();
        let err = feed.prepare(&mut frame).unwrap_err();
        match err {
            IngestError::MissingColumn { table, column } => {
                assert_eq!(table, "covid_states");
                assert_eq!(column, "negative");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_required_columns_cover_derivations_and_records() {
        let feed = FeedSpec::states("mem://states");
        assert_eq!(feed.required_columns(), vec!["date", "positive", "negative", "state"]);

        let feed = FeedSpec::world("mem://world");
        assert_eq!(
            feed.required_columns(),
            vec![
                "date",
                "new_deaths",
                "new_cases",
                "new_tests",
                "location",
                "new_cases_per_million"
            ]
        );
    }

    #[test]
    fn test_bad_date_aborts() {
        let feed = FeedSpec::states("mem://states");
        let mut frame = feed
            .parse("date,state,positive,negative\n20200301,OH,1,1\nyesterday,OH,1,1")
            .unwrap();
        let err = feed.prepare(&mut frame).unwrap_err();
        assert!(matches!(err, IngestError::InvalidDate { line: 3, .. }));
    }

    #[test]
    fn test_existing_derived_column_is_replaced() {
        let feed = FeedSpec::states("mem://states");
        let mut frame = feed
            .parse("date,state,positive,negative,total_tests\n20200301,OH,1,3,99")
            .unwrap();
        feed.prepare(&mut frame).unwrap();
        assert_eq!(cell(&frame, 0, "total_tests"), &Cell::Integer(4));
        assert_eq!(cell(&frame, 0, "pos_per_tests"), &Cell::Real(0.25));
    }

    #[test]
    fn test_missing_dashboard_columns_are_reported() {
        let feed = FeedSpec::states("mem://states");
        let mut frame = feed.parse("date,positive,negative\n20200301,1,1").unwrap();
        let err = feed.prepare(&mut frame).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { ref column, .. } if column == "state"));

        let feed = FeedSpec::world("mem://world");
        let mut frame = feed
            .parse("location,date,new_cases,new_deaths,new_tests\nHungary,2020-03-01,10,1,200")
            .unwrap();
        let err = feed.prepare(&mut frame).unwrap_err();
        match err {
            IngestError::MissingColumn { table, column } => {
                assert_eq!(table, "covid_world");
                assert_eq!(column, "new_cases_per_million");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
