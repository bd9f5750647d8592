//! Axum JSON API over the deal aggregation service.
//!
//! Per-source failures never reach API clients; only a fan-out where every
//! source failed surfaces as an error payload, matching the
//! degrade-silently policy of the pipeline.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bdf_adapters::SourceRegistry;
use bdf_agg::{AggregateError, AggregatorConfig, DealQueryRequest, DealService};
use bdf_core::{
    apply_filter, normalize, DealFilter, DealRecord, DealTab, Platform, RawDeal, SortOrder,
};
use bdf_store::CuratedDealStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::info;

pub const CRATE_NAME: &str = "bdf-web";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DealService>,
    pub store: Arc<CuratedDealStore>,
    pub registry: SourceRegistry,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/deals", get(deals_handler))
        .route("/deals/refresh", post(refresh_handler))
        .route("/sources", get(sources_handler))
        .route("/curated", post(curated_handler))
        .with_state(Arc::new(state))
}

/// Build state from the environment and serve until shutdown. Keeps the
/// auto-refresh task alive for the lifetime of the server.
pub async fn serve_from_env() -> anyhow::Result<()> {
    serve(None).await
}

/// Like [`serve_from_env`], with `port` taking precedence over
/// `BDF_WEB_PORT` when given.
pub async fn serve(port: Option<u16>) -> anyhow::Result<()> {
    let port: u16 = port
        .or_else(|| {
            std::env::var("BDF_WEB_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
        })
        .unwrap_or(8000);
    let curated_path =
        std::env::var("BDF_CURATED_PATH").unwrap_or_else(|_| "curated.json".to_string());
    let sources_path =
        std::env::var("BDF_SOURCES_PATH").unwrap_or_else(|_| "sources.yaml".to_string());

    let store = Arc::new(CuratedDealStore::load(curated_path).await?);
    let registry = SourceRegistry::load(sources_path)?;
    let service = Arc::new(DealService::new(
        AggregatorConfig::from_env(),
        Arc::clone(&store),
    ));
    let _auto_refresh = service.spawn_auto_refresh();

    let state = AppState {
        service,
        store,
        registry,
    };
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "serving deal API");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

#[derive(Debug, Deserialize, Default)]
struct DealsQuery {
    q: Option<String>,
    category: Option<String>,
    /// Comma-separated category list; combined with `category`.
    categories: Option<String>,
    /// Comma-separated platform list. Empty or absent means no narrowing.
    platforms: Option<String>,
    price_min: Option<f64>,
    price_max: Option<f64>,
    tab: Option<String>,
    sort: Option<String>,
    limit: Option<usize>,
    /// `true` bypasses the cache for this request.
    refresh: Option<bool>,
}

#[derive(Debug, Serialize)]
struct DealsResponse {
    success: bool,
    deals: Vec<DealRecord>,
    total_results: usize,
}

#[derive(Debug, Serialize)]
struct RefreshResponse {
    success: bool,
    total_results: usize,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: error.into(),
        }),
    )
        .into_response()
}

fn aggregate_error_response(err: AggregateError) -> Response {
    error_response(StatusCode::BAD_GATEWAY, err.to_string())
}

fn split_csv(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl DealsQuery {
    fn filter(&self) -> Result<DealFilter, Response> {
        let tab = match self.tab.as_deref() {
            Some(raw) => DealTab::from_str(raw)
                .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.to_string()))?,
            None => DealTab::All,
        };
        let sort = match self.sort.as_deref() {
            Some(raw) => Some(
                SortOrder::from_str(raw)
                    .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.to_string()))?,
            ),
            None => None,
        };

        let mut categories = split_csv(self.categories.as_deref());
        if let Some(category) = self.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            categories.push(category.to_string());
        }
        let platforms = split_csv(self.platforms.as_deref())
            .into_iter()
            .map(Platform::from)
            .collect();

        Ok(DealFilter {
            search: self.q.clone(),
            platforms,
            categories,
            price_min: self.price_min,
            price_max: self.price_max,
            tab,
            sort,
        })
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn deals_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DealsQuery>,
) -> Response {
    let filter = match query.filter() {
        Ok(filter) => filter,
        Err(response) => return response,
    };

    let request = DealQueryRequest {
        query: query.q.clone(),
        category: query.category.clone(),
        platform: None,
        limit: None,
        use_cache: !query.refresh.unwrap_or(false),
    };
    let page = match state.service.get_deals(&request).await {
        Ok(page) => page,
        Err(err) => return aggregate_error_response(err),
    };

    let mut deals = apply_filter(&page.deals, &filter);
    if let Some(limit) = query.limit {
        deals.truncate(limit);
    }

    Json(DealsResponse {
        success: true,
        deals,
        total_results: page.total_results,
    })
    .into_response()
}

async fn refresh_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.service.force_refresh().await {
        Ok(total_results) => Json(RefreshResponse {
            success: true,
            total_results,
        })
        .into_response(),
        Err(err) => aggregate_error_response(err),
    }
}

async fn sources_handler(State(state): State<Arc<AppState>>) -> Json<SourceRegistry> {
    Json(state.registry.clone())
}

async fn curated_handler(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<RawDeal>,
) -> Response {
    // The store mints the final id under its own lock; the index here is a
    // placeholder.
    let Some(record) = normalize(&raw, "curated", Utc::now().timestamp(), 0) else {
        return error_response(StatusCode::BAD_REQUEST, "curated deal needs a title");
    };
    match state.store.append(record).await {
        Ok(stored) => (StatusCode::CREATED, Json(stored)).into_response(),
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}
