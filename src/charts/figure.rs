//! Figure types
//!
//! Plotly-compatible figure JSON: a list of traces plus a layout. Only the
//! attributes the dashboard sets are modelled.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::ChartConfig;

/// Text color of the dark theme
pub const DARK_FONT: &str = "#f2f5fa";

/// Axis line and tick color of the dark theme
pub const DARK_AXIS: &str = "#506784";

/// Zero line color of the dark theme
pub const DARK_ZEROLINE: &str = "#283442";

/// Fully transparent background
pub const TRANSPARENT: &str = "rgba(0, 0, 0, 0)";

/// A chart: series plus layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

/// One line series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    pub x: Vec<NaiveDate>,
    /// `None` serializes as `null` and breaks the line
    pub y: Vec<Option<f64>>,
    pub mode: &'static str,
    pub opacity: f64,
    pub textposition: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
}

impl Trace {
    /// A line series from `(date, value)` points
    pub fn line(
        name: impl Into<String>,
        color: Option<&str>,
        points: impl IntoIterator<Item = (NaiveDate, Option<f64>)>,
    ) -> Self {
        let (x, y) = points.into_iter().unzip();
        Self {
            kind: "scatter",
            name: name.into(),
            x,
            y,
            mode: "lines",
            opacity: 0.7,
            textposition: "bottom center",
            line: color.map(|c| LineStyle {
                color: c.to_string(),
                dash: None,
                width: None,
            }),
        }
    }

    /// Points of the series in draw order
    pub fn points(&self) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn color(&self) -> Option<&str> {
        self.line.as_ref().map(|l| l.color.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub colorway: Vec<String>,
    /// Global text style; unset means the Plotly default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    pub paper_bgcolor: &'static str,
    pub plot_bgcolor: &'static str,
    pub margin: Margin,
    pub hovermode: &'static str,
    pub autosize: bool,
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<Shape>,
}

impl Layout {
    /// Shared layout: palette, theme, title and a date x-axis from the
    /// configured epoch to `x_end`
    pub fn themed(theme: &ChartConfig, title: &str, x_end: NaiveDate) -> Self {
        Self {
            colorway: theme.palette.clone(),
            font: theme.dark.then(|| Font {
                color: DARK_FONT.to_string(),
            }),
            paper_bgcolor: TRANSPARENT,
            plot_bgcolor: TRANSPARENT,
            margin: Margin { b: 15 },
            hovermode: "x",
            autosize: true,
            title: Title {
                text: title.to_string(),
                font: Font {
                    color: "white".to_string(),
                },
                x: 0.5,
            },
            xaxis: Axis::themed(theme, Some(AxisRange::Dates([theme.epoch, x_end]))),
            yaxis: Axis::themed(theme, None),
            annotations: Vec::new(),
            shapes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Margin {
    pub b: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
    pub font: Font,
    pub x: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<AxisRange>,
    pub showgrid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linecolor: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zerolinecolor: Option<&'static str>,
}

impl Axis {
    /// Gridless axis, colored for the dark theme when it is on
    pub fn themed(theme: &ChartConfig, range: Option<AxisRange>) -> Self {
        let dark = |color| theme.dark.then_some(color);
        Self {
            range,
            showgrid: false,
            color: dark(DARK_FONT),
            linecolor: dark(DARK_AXIS),
            zerolinecolor: dark(DARK_ZEROLINE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AxisRange {
    Dates([NaiveDate; 2]),
    Numbers([f64; 2]),
}

/// Text placed at a data coordinate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub x: NaiveDate,
    pub y: f64,
}

/// Horizontal line segment: dates on x, paper fraction on y
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub xref: &'static str,
    pub x0: NaiveDate,
    pub x1: NaiveDate,
    pub yref: &'static str,
    pub y0: f64,
    pub y1: f64,
    pub line: LineStyle,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trace_serialization() {
        let date = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let trace = Trace::line("OH", Some("#EA62E3"), vec![(date, Some(0.1)), (date, None)]);
        let value = serde_json::to_value(&trace).unwrap();

        assert_eq!(value["type"], "scatter");
        assert_eq!(value["x"], json!(["2020-03-01", "2020-03-01"]));
        assert_eq!(value["y"], json!([0.1, null]));
        assert_eq!(value["line"], json!({"color": "#EA62E3"}));
    }

    #[test]
    fn test_themed_layout_serialization() {
        let theme = ChartConfig::default();
        let end = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
        let value = serde_json::to_value(Layout::themed(&theme, "T", end)).unwrap();

        assert_eq!(value["font"]["color"], "#f2f5fa");
        assert_eq!(value["xaxis"]["linecolor"], "#506784");
        assert!(value.get("template").is_none());
        assert_eq!(value["paper_bgcolor"], "rgba(0, 0, 0, 0)");
        assert_eq!(value["xaxis"]["range"], json!(["2020-02-01", "2020-06-01"]));
        assert!(value["yaxis"].get("range").is_none());
        assert!(value.get("shapes").is_none());
        assert_eq!(value["title"]["x"], 0.5);
    }

    #[test]
    fn test_light_theme_keeps_plotly_colors() {
        let theme = ChartConfig {
            dark: false,
            ..ChartConfig::default()
        };
        let layout = Layout::themed(&theme, "T", theme.epoch);
        assert_eq!(layout.font, None);
        assert_eq!(layout.xaxis.color, None);
        assert_eq!(layout.yaxis.zerolinecolor, None);
    }
}
