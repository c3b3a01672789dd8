//! Dashboard page
//!
//! Server-rendered with askama from `templates/dashboard.html`: a left
//! column with the two multi-select dropdowns and a right column with the
//! three chart containers. The page script keeps each dropdown's selection in
//! click order and posts it whenever the dropdown changes.

use askama::Template;

use crate::charts::ChartId;
use crate::config::DashboardConfig;
use crate::snapshot::{DropdownOption, Snapshot};

/// A dropdown entry as rendered
struct OptionView {
    label: String,
    value: String,
    /// Position in the configured defaults; `Some` means pre-selected
    rank: Option<usize>,
}

struct ChartView {
    element_id: &'static str,
    input_id: &'static str,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardPage {
    states: Vec<OptionView>,
    countries: Vec<OptionView>,
    charts: Vec<ChartView>,
}

fn option_views(options: Vec<DropdownOption>, defaults: &[String]) -> Vec<OptionView> {
    options
        .into_iter()
        .map(|option| OptionView {
            rank: defaults.iter().position(|d| d == &option.value),
            label: option.label,
            value: option.value,
        })
        .collect()
}

/// Render the full page
pub fn render(snapshot: &Snapshot, config: &DashboardConfig) -> Result<String, askama::Error> {
    let page = DashboardPage {
        states: option_views(snapshot.state_options(), &config.default_states),
        countries: option_views(snapshot.country_options(), &config.default_countries),
        charts: ChartId::ALL
            .iter()
            .map(|chart| ChartView {
                element_id: chart.element_id(),
                input_id: chart.input_id(),
            })
            .collect(),
    };
    page.render()
}
