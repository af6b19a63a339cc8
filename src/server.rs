use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::data::model::{CountryOption, Metric, ProcessedTable};
use crate::data::options::{country_options, default_selection};
use crate::view::{map_view, plotly, trend_view, ViewSpec};

const DASHBOARD_HTML: &str = include_str!("../assets/dashboard.html");

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Everything the handlers read. Built once, never mutated.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<ProcessedTable>,
    pub layout: Arc<DashboardLayout>,
}

impl AppState {
    pub fn new(table: ProcessedTable, default_country: &str) -> Self {
        let layout = DashboardLayout::new(&table, default_country);
        log::info!("{} country options", layout.country_options.len());
        Self {
            table: Arc::new(table),
            layout: Arc::new(layout),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricOption {
    pub label: &'static str,
    pub value: Metric,
}

/// Control definitions for the page: options and initial values.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardLayout {
    pub metric_options: Vec<MetricOption>,
    pub default_metric: Metric,
    pub country_options: Vec<CountryOption>,
    pub default_countries: Vec<String>,
}

impl DashboardLayout {
    pub fn new(table: &ProcessedTable, default_country: &str) -> Self {
        let country_options = country_options(table);
        let default_countries = default_selection(&country_options, default_country);
        Self {
            metric_options: Metric::ALL
                .into_iter()
                .map(|m| MetricOption {
                    label: m.label(),
                    value: m,
                })
                .collect(),
            default_metric: Metric::default(),
            country_options,
            default_countries,
        }
    }
}

/// Current values of the two controls.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewRequest {
    #[serde(default)]
    pub metric: Metric,
    #[serde(default)]
    pub countries: Vec<String>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

struct ServerError(anyhow::Error);

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        log::error!("request failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("{:#}", self.0) })),
        )
            .into_response()
    }
}

impl<E> From<E> for ServerError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/api/layout", get(layout))
        .route("/api/figures/map", post(map_figure))
        .route("/api/figures/trend", post(trend_figure))
        .route("/api/views/map", post(map_spec))
        .route("/api/views/trend", post(trend_spec))
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    log::info!("Dashboard listening on http://{addr}");
    axum::serve(listener, router(state)).await.context("server failed")
}

async fn index() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

async fn healthz(State(st): State<AppState>) -> Json<Value> {
    Json(json!({ "ok": true, "rows": st.table.len() }))
}

async fn layout(State(st): State<AppState>) -> Json<DashboardLayout> {
    Json(st.layout.as_ref().clone())
}

async fn map_figure(State(st): State<AppState>, Json(req): Json<ViewRequest>) -> Result<Json<Value>, ServerError> {
    // Cost grows with the table; keep it off the async workers.
    let fig = tokio::task::spawn_blocking(move || {
        plotly::figure(&map_view(&st.table, req.metric, &req.countries))
    })
    .await?;
    Ok(Json(fig))
}

async fn trend_figure(State(st): State<AppState>, Json(req): Json<ViewRequest>) -> Json<Value> {
    Json(plotly::figure(&trend_view(&st.table, req.metric, &req.countries)))
}

async fn map_spec(State(st): State<AppState>, Json(req): Json<ViewRequest>) -> Result<Json<ViewSpec>, ServerError> {
    let spec = tokio::task::spawn_blocking(move || map_view(&st.table, req.metric, &req.countries)).await?;
    Ok(Json(spec))
}

async fn trend_spec(State(st): State<AppState>, Json(req): Json<ViewRequest>) -> Json<ViewSpec> {
    Json(trend_view(&st.table, req.metric, &req.countries))
}
