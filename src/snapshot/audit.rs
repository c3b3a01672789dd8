//! Consistency checks on the state table
//!
//! `total_tests` should equal `positive + negative`, and where tests were
//! run the positivity ratio should sit in `[0, 1]`. Neither is enforced at
//! ingest; violations are collected here so bootstrap can report them.

use chrono::NaiveDate;
use serde::Serialize;

use super::records::StateRecord;

/// A single inconsistent state row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    TotalMismatch {
        state: String,
        date: NaiveDate,
        expected: Option<f64>,
        actual: Option<f64>,
    },
    RatioOutOfRange {
        state: String,
        date: NaiveDate,
        ratio: f64,
    },
}

/// Result of checking every state row
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditReport {
    pub rows_checked: usize,
    pub violations: Vec<Violation>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn total_mismatches(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| matches!(v, Violation::TotalMismatch { .. }))
            .count()
    }

    pub fn ratios_out_of_range(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| matches!(v, Violation::RatioOutOfRange { .. }))
            .count()
    }
}

fn same(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

/// Check every record
pub fn audit_states<'a>(records: impl IntoIterator<Item = &'a StateRecord>) -> AuditReport {
    let mut report = AuditReport::default();

    for record in records {
        report.rows_checked += 1;

        let expected = match (record.positive, record.negative) {
            (Some(p), Some(n)) => Some(p + n),
            _ => None,
        };
        let consistent = match (expected, record.total_tests) {
            (Some(e), Some(a)) => same(e, a),
            (None, None) => true,
            _ => false,
        };
        if !consistent {
            report.violations.push(Violation::TotalMismatch {
                state: record.state.clone(),
                date: record.date,
                expected,
                actual: record.total_tests,
            });
        }

        if let (Some(total), Some(ratio)) = (record.total_tests, record.pos_per_tests) {
            if total > 0.0 && !(0.0..=1.0).contains(&ratio) {
                report.violations.push(Violation::RatioOutOfRange {
                    state: record.state.clone(),
                    date: record.date,
                    ratio,
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        positive: Option<f64>,
        negative: Option<f64>,
        total: Option<f64>,
        ratio: Option<f64>,
    ) -> StateRecord {
        StateRecord {
            state: "OH".to_string(),
            date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            positive,
            negative,
            total_tests: total,
            pos_per_tests: ratio,
        }
    }

    #[test]
    fn test_consistent_rows_are_clean() {
        let rows = vec![
            record(Some(100.0), Some(900.0), Some(1000.0), Some(0.1)),
            record(Some(0.0), Some(0.0), Some(0.0), None),
            record(None, Some(5.0), None, None),
        ];
        let report = audit_states(&rows);
        assert_eq!(report.rows_checked, 3);
        assert!(report.is_clean());
    }

    #[test]
    fn test_violations_are_surfaced() {
        let rows = vec![
            // stale total
            record(Some(100.0), Some(900.0), Some(999.0), Some(0.1)),
            // negative count pushes the ratio past one
            record(Some(10.0), Some(-5.0), Some(5.0), Some(2.0)),
        ];
        let report = audit_states(&rows);
        assert_eq!(report.total_mismatches(), 1);
        assert_eq!(report.ratios_out_of_range(), 1);
        assert!(matches!(
            report.violations[1],
            Violation::RatioOutOfRange { ratio, .. } if ratio == 2.0
        ));
    }
}
