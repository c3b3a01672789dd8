//! Chart Data
//!
//! Turns a dropdown selection into a Plotly figure.
//!
//! - **figure**: serializable figure, trace and layout types
//! - **handlers**: the three chart functions and their element ids

pub mod figure;
pub mod handlers;

pub use figure::{Axis, AxisRange, Figure, Layout, Trace};
pub use handlers::{
    cumulative_positive, positivity_ratio, render, series_color, world_case_rate, ChartId,
    UnknownChart,
};
