//! JSON API for the dashboard UI, plus the CSV download and static assets.
//!
//! Every filterable endpoint accepts the same query parameters: `wards`,
//! `waste_types`, `actors` (|-separated value lists; absent or empty means
//! "all"; `|` because field values may themselves contain commas) and
//! `alerts_only` (bool, default false). Each request recomputes the filtered
//! view from the immutable dataset, which is the whole reactive model.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use metrics::counter;
use serde::Deserialize;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::charts;
use crate::dataset::{Dataset, Record};
use crate::export::{self, EXPORT_FILE_NAME};
use crate::filter::{self, FilterOptions, FilterSelection, FilteredView, Summary};
use crate::map::{self, MapModel};
use crate::palette::Palette;

pub const DEFAULT_UI_DIR: &str = "ui";
pub const ENV_UI_DIR: &str = "UI_DIR";

#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub palette: Arc<Palette>,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>, palette: Palette) -> Self {
        Self {
            dataset,
            palette: Arc::new(palette),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let ui_dir = std::env::var(ENV_UI_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_UI_DIR));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/options", get(options))
        .route("/api/summary", get(summary))
        .route("/api/map", get(map_model))
        .route("/api/charts/wards", get(chart_wards))
        .route("/api/charts/reasons", get(chart_reasons))
        .route("/api/charts/interventions", get(chart_interventions))
        .route("/api/records", get(records))
        .route("/api/export.csv", get(export_csv))
        .fallback_service(ServeDir::new(ui_dir))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Wire form of the filter controls.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    #[serde(default)]
    wards: Option<String>,
    #[serde(default)]
    waste_types: Option<String>,
    #[serde(default)]
    actors: Option<String>,
    #[serde(default)]
    alerts_only: Option<bool>,
}

impl FilterParams {
    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            wards: split_list(self.wards.as_deref()),
            waste_types: split_list(self.waste_types.as_deref()),
            actors: split_list(self.actors.as_deref()),
            alerts_only: self.alerts_only.unwrap_or(false),
        }
    }
}

fn split_list(raw: Option<&str>) -> BTreeSet<String> {
    raw.unwrap_or_default()
        .split('|')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn filtered(state: &AppState, params: &FilterParams) -> FilteredView {
    counter!("dashboard_filter_requests_total").increment(1);
    params.selection().apply(&state.dataset)
}

async fn options(State(state): State<AppState>) -> Json<FilterOptions> {
    Json(filter::options(&state.dataset))
}

async fn summary(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Json<Summary> {
    Json(filtered(&state, &params).summary())
}

async fn map_model(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Json<MapModel> {
    let view = filtered(&state, &params);
    Json(map::build(&view, &state.palette))
}

async fn chart_wards(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Json<charts::WardChart> {
    Json(charts::waste_by_ward(&filtered(&state, &params)))
}

async fn chart_reasons(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Json<charts::FrequencyChart> {
    Json(charts::reason_frequency(&filtered(&state, &params)))
}

async fn chart_interventions(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Json<charts::WordCloud> {
    Json(charts::intervention_cloud(&filtered(&state, &params)))
}

async fn records(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Json<Vec<Record>> {
    let view = filtered(&state, &params);
    Json(view.iter().cloned().collect())
}

async fn export_csv(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> impl IntoResponse {
    let view = filtered(&state, &params);
    match export::to_csv_bytes(&view) {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
                ),
            ],
            bytes.as_ref().clone(),
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}
