//! Covid Dashboard Server
//!
//! HTTP layer for the dashboard, built with Axum.
//!
//! # Endpoints
//!
//! - `GET /` - The dashboard page
//! - `POST /_update/:chart` - Figure JSON for `pos_per_case`, `total_pos_case`
//!   or `pos_world`, given `{"value": [...]}`
//!
//! # Example
//!
//! ```rust,no_run
//! use covid_dash::config::Config;
//! use covid_dash::dashboard::{serve, DashboardState};
//! use covid_dash::snapshot::Snapshot;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let snapshot = Snapshot::load(&config.store.path)?;
//!     let state = DashboardState::new(snapshot, &config.dashboard, config.charts.clone())?;
//!     serve(state, &config.dashboard).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod page;
pub mod routes;
pub mod state;

pub use error::{DashboardError, DashboardResult};
pub use state::DashboardState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::DashboardConfig;

/// Build the dashboard router
pub fn build_router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/_update/:chart", post(routes::update_chart))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the dashboard server
pub async fn serve(state: DashboardState, config: &DashboardConfig) -> DashboardResult<()> {
    let started = state.clone();
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Dashboard listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DashboardError::Internal(format!("Server error: {}", e)))?;

    tracing::info!(
        uptime_seconds = started.uptime_seconds(),
        "Dashboard shut down gracefully"
    );
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartConfig;
    use crate::snapshot::{SeriesTable, Snapshot, StateRecord, WorldRecord};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use chrono::NaiveDate;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let date = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let states = SeriesTable::from_records(vec![StateRecord {
            state: "OH".to_string(),
            date,
            positive: Some(100.0),
            negative: Some(900.0),
            total_tests: Some(1000.0),
            pos_per_tests: Some(0.1),
        }]);
        let world = SeriesTable::from_records(vec![WorldRecord {
            location: "Hungary".to_string(),
            date,
            new_cases: Some(10.0),
            new_deaths: Some(0.0),
            new_tests: None,
            new_cases_per_million: Some(1.035),
            deaths_per_pos: Some(0.0),
            pos_per_tests: None,
        }]);
        let state = DashboardState::new(
            Snapshot::new(states, world),
            &DashboardConfig::default(),
            ChartConfig::default(),
        )
        .unwrap();
        build_router(state)
    }

    fn update(chart: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/_update/{}", chart))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_index_page() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains(r#"id="stateselector""#));
        assert!(page.contains(r#"id="ctryselector""#));
        assert!(page.contains(r#"id="pos_world""#));
    }

    #[tokio::test]
    async fn test_update_positivity() {
        let app = create_test_app();

        let response = app
            .oneshot(update("pos_per_case", r#"{"value": ["OH"]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let figure = json_body(response).await;
        assert_eq!(figure["data"][0]["name"], "OH");
        assert_eq!(figure["data"][0]["x"][0], "2020-03-01");
        assert_eq!(figure["data"][0]["y"][0], 0.1);
        assert_eq!(figure["layout"]["font"]["color"], "#f2f5fa");
        assert_eq!(figure["layout"]["shapes"][0]["y0"], 0.1);
    }

    #[tokio::test]
    async fn test_update_world() {
        let app = create_test_app();

        let response = app
            .oneshot(update("pos_world", r#"{"value": ["Hungary"]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let figure = json_body(response).await;
        assert_eq!(figure["data"].as_array().unwrap().len(), 1);
        assert_eq!(figure["data"][0]["y"][0], 1.035);
    }

    #[tokio::test]
    async fn test_empty_selection() {
        let app = create_test_app();

        for body in [r#"{"value": []}"#, r#"{"value": null}"#, "{}"] {
            let response = app
                .clone()
                .oneshot(update("total_pos_case", body))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            let figure = json_body(response).await;
            assert!(figure["data"].as_array().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_unknown_chart() {
        let app = create_test_app();

        let response = app
            .oneshot(update("pos_mars", r#"{"value": ["OH"]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let app = create_test_app();

        let response = app
            .oneshot(update("pos_per_case", "{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
