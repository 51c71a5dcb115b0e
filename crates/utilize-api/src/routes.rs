//! HTTP routes for the dashboard API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use device_finances::config::DashboardConfig;
use device_finances::dataset::{self, InitialDataResponse};
use device_finances::store::DataCache;

pub struct AppState {
    pub cache: DataCache,
    pub dashboard: DashboardConfig,
}

pub enum AppError {
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

async fn health_handler() -> &'static str {
    "OK"
}

/// GET /api/initial-data: the validated device catalog keyed by AE title.
async fn initial_data_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<InitialDataResponse>, AppError> {
    Ok(Json(InitialDataResponse {
        bme_map: state.cache.catalog.devices().clone(),
        error: None,
    }))
}

/// GET /api/device-data/{ae_title}: the full dataset for one device.
async fn device_data_handler(
    State(state): State<Arc<AppState>>,
    Path(ae_title): Path<String>,
) -> Result<Response, AppError> {
    if ae_title.trim().is_empty() {
        return Err(AppError::BadRequest("AE title must not be empty".to_string()));
    }

    let today = chrono::Local::now().date_naive();
    match dataset::build_device_data(&ae_title, &state.cache, today, &state.dashboard) {
        Some(response) => {
            info!(%ae_title, records = response.pacs_data_details.len(), "device dataset served");
            Ok(Json(response).into_response())
        }
        None => Err(AppError::NotFound(format!(
            "Device '{}' not found",
            ae_title
        ))),
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/initial-data", get(initial_data_handler))
        .route("/api/device-data/{ae_title}", get(device_data_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
