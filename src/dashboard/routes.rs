//! Dashboard Routes
//!
//! - GET / - The dashboard page
//! - POST /_update/:chart - Figure for the current dropdown selection

use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::error::DashboardResult;
use super::state::DashboardState;
use crate::charts::{self, ChartId, Figure};

/// Body posted by the page when a dropdown changes
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRequest {
    /// Selected dropdown values, in selection order
    #[serde(default)]
    pub value: Option<Vec<String>>,
}

/// GET /
pub async fn index(State(state): State<Arc<DashboardState>>) -> Html<String> {
    Html(state.page.to_string())
}

/// POST /_update/:chart
///
/// A missing or null `value` is treated as an empty selection.
pub async fn update_chart(
    Path(chart): Path<String>,
    State(state): State<Arc<DashboardState>>,
    Json(request): Json<UpdateRequest>,
) -> DashboardResult<Json<Figure>> {
    let chart: ChartId = chart.parse()?;
    let selection = request.value.unwrap_or_default();

    tracing::debug!(chart = %chart, selected = selection.len(), "Rendering chart");

    let figure = charts::render(chart, &state.snapshot, &state.charts, &selection);
    Ok(Json(figure))
}
