use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use salon_core::booking::{BookingDesk, BookingError, BookingRequest, BookingStatus};
use salon_core::persist::load_catalog;
use salon_core::{query, Catalog, QueryParameters, SalonRecord, SalonSummary, ServiceType, DEFAULT_PAGE_SIZE};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Catalog file to serve; the built-in demo catalog when unset.
    pub catalog: Option<PathBuf>,
    pub page_size: usize,
    /// Artificial delay added to every search response.
    pub latency: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { catalog: None, page_size: DEFAULT_PAGE_SIZE, latency: Duration::ZERO }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub params: QueryParameters,
    pub query_string: String,
    pub active_filters: usize,
    pub took_s: f64,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub results: Vec<SalonSummary>,
}

#[derive(Serialize)]
pub struct ServiceTypeInfo {
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub label: &'static str,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub bookings: Arc<BookingDesk>,
    pub page_size: usize,
    pub latency: Duration,
}

impl AppState {
    pub fn new(catalog: Catalog, config: &AppConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            bookings: Arc::new(BookingDesk::new()),
            page_size: config.page_size.max(1),
            latency: config.latency,
        }
    }
}

pub fn build_app(config: AppConfig) -> Result<Router> {
    // Load the catalog once at startup
    let catalog = match &config.catalog {
        Some(path) => load_catalog(path)?,
        None => salon_core::catalog::mock_catalog().clone(),
    };
    let issues = catalog.validate();
    for issue in &issues {
        tracing::warn!(%issue, "catalog issue");
    }
    tracing::info!(salons = catalog.len(), issues = issues.len(), page_size = config.page_size, "catalog ready");
    Ok(router(AppState::new(catalog, &config)))
}

pub fn router(app_state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/salons/:id", get(salon_handler))
        .route("/services", get(services_handler))
        .route("/bookings", post(booking_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, Query(raw): Query<HashMap<String, String>>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let params = QueryParameters::from_pairs(&raw);
    if !state.latency.is_zero() {
        tokio::time::sleep(state.latency).await;
    }

    let result = query(state.catalog.records(), &params, state.page_size);
    let total_pages = result.total_pages(state.page_size);
    let results: Vec<SalonSummary> = result.page.iter().map(|s| s.summary()).collect();

    let elapsed = start.elapsed();
    Json(SearchResponse {
        query_string: params.to_query_string(),
        active_filters: params.active_filter_count(),
        took_s: elapsed.as_secs_f64(),
        total: result.total_matched,
        page: params.page,
        page_size: state.page_size,
        total_pages,
        results,
        params,
    })
}

pub async fn salon_handler(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<SalonRecord>, (StatusCode, Json<serde_json::Value>)> {
    match state.catalog.get(&id) {
        Some(salon) => Ok(Json(salon.clone())),
        None => Err((StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found", "id": id })))),
    }
}

pub async fn services_handler() -> Json<Vec<ServiceTypeInfo>> {
    Json(
        ServiceType::ALL
            .iter()
            .map(|t| ServiceTypeInfo { service_type: *t, label: t.label() })
            .collect(),
    )
}

pub async fn booking_handler(State(state): State<AppState>, Json(request): Json<BookingRequest>) -> (StatusCode, Json<BookingStatus>) {
    let today = time::OffsetDateTime::now_utc().date();
    let outcome = state.bookings.book(&state.catalog, &request, today);
    let status = match &outcome {
        Ok(_) => StatusCode::CREATED,
        Err(BookingError::UnknownSalon(_)) => StatusCode::NOT_FOUND,
        Err(BookingError::Invalid(fields)) => {
            tracing::debug!(salon = %request.salon_id, invalid = fields.len(), "booking rejected");
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };
    (status, Json(BookingStatus::from(outcome)))
}
