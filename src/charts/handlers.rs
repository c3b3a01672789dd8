//! Chart handlers
//!
//! Pure functions from a selection to a figure. Each call rebuilds the figure
//! from the snapshot; nothing is cached between calls.
//!
//! Series follow the selection: trace `i` is the `i`-th selected key and
//! takes palette color `i % palette.len()`. An unknown key still gets a
//! trace, with no points.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

use super::figure::{Annotation, AxisRange, Figure, Layout, LineStyle, Shape, Trace};
use crate::config::ChartConfig;
use crate::snapshot::{Record, SeriesTable, Snapshot, StateRecord, WorldRecord};

/// The three dashboard charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartId {
    /// Daily cases per million by country
    WorldCaseRate,
    /// Daily positive:tests ratio by state
    PositivityRatio,
    /// Cumulative positive cases by state
    CumulativePositive,
}

impl ChartId {
    pub const ALL: [ChartId; 3] = [
        ChartId::PositivityRatio,
        ChartId::CumulativePositive,
        ChartId::WorldCaseRate,
    ];

    /// Element id of the chart container
    pub fn element_id(&self) -> &'static str {
        match self {
            ChartId::WorldCaseRate => "pos_world",
            ChartId::PositivityRatio => "pos_per_case",
            ChartId::CumulativePositive => "total_pos_case",
        }
    }

    /// Element id of the dropdown that drives the chart
    pub fn input_id(&self) -> &'static str {
        match self {
            ChartId::WorldCaseRate => "ctryselector",
            ChartId::PositivityRatio | ChartId::CumulativePositive => "stateselector",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartId::WorldCaseRate => "World Daily Cases per Million",
            ChartId::PositivityRatio => "Daily Positive:Tests Ratio",
            ChartId::CumulativePositive => "Reported Positive Cases",
        }
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_id())
    }
}

/// Unrecognized chart element id
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown chart: {0}")]
pub struct UnknownChart(pub String);

impl FromStr for ChartId {
    type Err = UnknownChart;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartId::ALL
            .into_iter()
            .find(|c| c.element_id() == s)
            .ok_or_else(|| UnknownChart(s.to_string()))
    }
}

/// Build the figure for `chart`
pub fn render(
    chart: ChartId,
    snapshot: &Snapshot,
    theme: &ChartConfig,
    selection: &[String],
) -> Figure {
    match chart {
        ChartId::WorldCaseRate => world_case_rate(&snapshot.world, theme, selection),
        ChartId::PositivityRatio => positivity_ratio(&snapshot.states, theme, selection),
        ChartId::CumulativePositive => cumulative_positive(&snapshot.states, theme, selection),
    }
}

/// Cases per million for each selected country
pub fn world_case_rate(
    world: &SeriesTable<WorldRecord>,
    theme: &ChartConfig,
    selection: &[String],
) -> Figure {
    Figure {
        data: line_traces(world, theme, selection, |r| r.new_cases_per_million),
        layout: Layout::themed(theme, ChartId::WorldCaseRate.title(), x_end(world, theme)),
    }
}

/// Positive:tests ratio for each selected state, against the target line
pub fn positivity_ratio(
    states: &SeriesTable<StateRecord>,
    theme: &ChartConfig,
    selection: &[String],
) -> Figure {
    let mut layout = Layout::themed(theme, ChartId::PositivityRatio.title(), x_end(states, theme));
    layout.yaxis.range = Some(AxisRange::Numbers([0.0, 1.0]));
    layout.annotations.push(Annotation {
        text: theme.target_label.clone(),
        x: theme.target_label_date,
        y: theme.target_ratio,
    });
    layout.shapes.push(Shape {
        kind: "line",
        xref: "x",
        x0: theme.epoch,
        x1: theme.target_line_end,
        yref: "paper",
        y0: theme.target_ratio,
        y1: theme.target_ratio,
        line: LineStyle {
            color: "#33DBD3".to_string(),
            dash: Some("dot"),
            width: Some(0.5),
        },
    });

    Figure {
        data: line_traces(states, theme, selection, |r| r.pos_per_tests),
        layout,
    }
}

/// Cumulative positive count for each selected state
pub fn cumulative_positive(
    states: &SeriesTable<StateRecord>,
    theme: &ChartConfig,
    selection: &[String],
) -> Figure {
    Figure {
        data: line_traces(states, theme, selection, |r| r.positive),
        layout: Layout::themed(theme, ChartId::CumulativePositive.title(), x_end(states, theme)),
    }
}

/// Palette color for the series at `position`
pub fn series_color(theme: &ChartConfig, position: usize) -> Option<&str> {
    if theme.palette.is_empty() {
        return None;
    }
    Some(theme.palette[position % theme.palette.len()].as_str())
}

fn x_end<R: Record>(table: &SeriesTable<R>, theme: &ChartConfig) -> NaiveDate {
    table.latest_date().unwrap_or(theme.epoch)
}

fn line_traces<R, F>(
    table: &SeriesTable<R>,
    theme: &ChartConfig,
    selection: &[String],
    value: F,
) -> Vec<Trace>
where
    R: Record,
    F: Fn(&R) -> Option<f64>,
{
    selection
        .iter()
        .enumerate()
        .map(|(position, key)| {
            Trace::line(
                key.as_str(),
                series_color(theme, position),
                table.series(key).iter().map(|r| (r.date(), value(r))),
            )
        })
        .collect()
}
