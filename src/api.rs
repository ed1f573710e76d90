/// HTTP API дашборда

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::cache::DatasetCache;
use crate::error::DatasetError;
use crate::models::age_bands::AgeBandGroup;
use crate::models::dashboard::DashboardView;
use crate::models::filtering::{filter, FilterCriteria};
use crate::preprocessing::write_csv;
use crate::types::{Dataset, DatasetMeta, FilterOptions};

/// Значение селектора, означающее «без фильтра»
const ALL_SENTINEL: &str = "전체";

/// Кэш под `std::sync::Mutex`: чтение, хэширование и разбор файла идут
/// в пуле блокирующих задач, а не на рабочих потоках tokio
#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub cache: Arc<Mutex<DatasetCache>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, cache: DatasetCache) -> Self {
        Self {
            data_path,
            cache: Arc::new(Mutex::new(cache)),
        }
    }
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(serde_json::json!({ "error": message.into() })))
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub city: Option<String>,
    pub district: Option<String>,
    pub subdivision: Option<String>,
    pub age_group: Option<String>,
}

impl DashboardQuery {
    pub fn into_criteria(self) -> Result<FilterCriteria, ApiError> {
        let age_band_group = match selected(self.age_group) {
            Some(label) => Some(AgeBandGroup::parse(&label).ok_or_else(|| {
                api_error(
                    StatusCode::BAD_REQUEST,
                    format!("unknown age group '{}'", label),
                )
            })?),
            None => None,
        };

        Ok(FilterCriteria {
            city: selected(self.city),
            district: selected(self.district),
            subdivision: selected(self.subdivision),
            age_band_group,
        })
    }
}

fn selected(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != ALL_SENTINEL)
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/dataset", get(dataset_meta))
        .route("/api/filters", get(filter_options))
        .route("/api/dashboard", get(dashboard))
        .route("/api/records.csv", get(records_csv))
        .layer(cors)
        .with_state(state)
}

fn load_sync(cache: &Mutex<DatasetCache>, path: &Path) -> Result<Arc<Dataset>, DatasetError> {
    // Кэш не остаётся в промежуточном состоянии при панике, poison можно снять
    let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
    cache.get_or_load(path)
}

async fn load(state: &AppState) -> Result<Arc<Dataset>, ApiError> {
    let cache = Arc::clone(&state.cache);
    let path = state.data_path.clone();
    let join = tokio::task::spawn_blocking(move || load_sync(&cache, &path));

    match join.await {
        Ok(Ok(dataset)) => Ok(dataset),
        Ok(Err(e)) => {
            tracing::error!("Failed to load dataset: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
        Err(e) => {
            tracing::error!("Dataset load task failed: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("join error: {e}"),
            ))
        }
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Census Dashboard API (Rust)",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn dataset_meta(State(state): State<AppState>) -> Result<Json<DatasetMeta>, ApiError> {
    let dataset = load(&state).await?;
    Ok(Json(dataset.meta.clone()))
}

async fn filter_options(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<FilterOptions>, ApiError> {
    let criteria = query.into_criteria()?;
    let dataset = load(&state).await?;
    Ok(Json(FilterOptions::cascade(&dataset.table, &criteria)))
}

async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardView>, ApiError> {
    let criteria = query.into_criteria()?;
    tracing::info!("Dashboard request: {:?}", criteria);

    let dataset = load(&state).await?;
    Ok(Json(DashboardView::render(&dataset.table, &criteria)))
}

async fn records_csv(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, ApiError> {
    let criteria = query.into_criteria()?;
    let dataset = load(&state).await?;
    let view = filter(&dataset.table, &criteria);

    let mut body = Vec::new();
    write_csv(&view, &mut body)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        body,
    )
        .into_response())
}
