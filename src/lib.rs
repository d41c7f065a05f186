//! Stoneworks API Library
//!
//! This crate provides the core functionality for the Stoneworks shop API:
//! customers, sale orders with measurements, work-order conversion with
//! production stages, and the weekly crew scheduling calendar.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod logging;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    /// Page size; falls back to the configured default and is capped at the
    /// configured maximum.
    pub limit: Option<u64>,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn page_size(&self, cfg: &config::AppConfig) -> u64 {
        self.limit
            .unwrap_or(cfg.api_default_page_size as u64)
            .clamp(1, cfg.api_max_page_size as u64)
    }
}

fn default_page() -> u64 {
    1
}

/// Envelope for every successful JSON response. Failures bypass this and
/// render [`errors::ErrorResponse`] instead.
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_envelope_keeps_data_and_captures_request_id() {
        let response = crate::tracing::scope_request_id(
            crate::tracing::RequestId::new("envelope-1"),
            async { ApiResponse::success(vec![1, 2, 3]) },
        )
        .await;

        assert!(response.success);
        assert_eq!(response.data, Some(vec![1, 2, 3]));

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("envelope-1"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn success_envelope_without_request_scope_has_no_request_id() {
        let response = ApiResponse::success("ok");
        let meta = response.meta.expect("metadata expected");
        assert!(meta.request_id.is_none());
    }

    #[test]
    fn page_size_falls_back_to_config_and_respects_cap() {
        let cfg = config::AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "development".into(),
        );

        let defaulted = ListQuery {
            page: 1,
            limit: None,
            search: None,
        };
        assert_eq!(defaulted.page_size(&cfg), cfg.api_default_page_size as u64);

        let oversized = ListQuery {
            page: 1,
            limit: Some(10_000),
            search: None,
        };
        assert_eq!(oversized.page_size(&cfg), cfg.api_max_page_size as u64);

        let zero = ListQuery {
            page: 1,
            limit: Some(0),
            search: None,
        };
        assert_eq!(zero.page_size(&cfg), 1);
    }
}

// API v1 routes
pub fn api_v1_routes() -> Router<AppState> {
    let customers = Router::new()
        .route(
            "/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/customers/:id",
            get(handlers::customers::get_customer)
                .put(handlers::customers::update_customer)
                .delete(handlers::customers::delete_customer),
        )
        .route(
            "/customers/:id/orders",
            get(handlers::customers::get_customer_orders),
        );

    let orders = Router::new()
        .route(
            "/orders",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route(
            "/orders/:id",
            get(handlers::orders::get_order)
                .put(handlers::orders::update_order)
                .delete(handlers::orders::delete_order),
        )
        .route(
            "/orders/:id/measurements",
            get(handlers::orders::get_order_measurements),
        );

    let measurements = Router::new()
        .route(
            "/measurements",
            post(handlers::measurements::create_measurement),
        )
        .route(
            "/measurements/:id",
            put(handlers::measurements::update_measurement)
                .delete(handlers::measurements::delete_measurement),
        );

    let work_orders = Router::new()
        .route(
            "/work-orders",
            get(handlers::work_orders::list_work_orders)
                .post(handlers::work_orders::create_work_order),
        )
        .route(
            "/work-orders/convert",
            post(handlers::work_orders::convert_to_work_order),
        )
        .route(
            "/work-orders/:id",
            get(handlers::work_orders::get_work_order).put(handlers::work_orders::update_work_order),
        )
        .route(
            "/work-orders/:id/stages",
            get(handlers::work_orders::get_work_order_stages),
        )
        .route(
            "/work-orders/:id/image",
            post(handlers::work_orders::attach_work_order_image),
        )
        .route("/stages/:id", put(handlers::work_orders::update_stage));

    let scheduling = Router::new()
        .route("/scheduling/calendar", get(handlers::scheduling::calendar))
        .route(
            "/scheduling/orders/available",
            get(handlers::scheduling::available_orders),
        )
        .route(
            "/scheduling/orders/working",
            get(handlers::scheduling::working_orders),
        )
        .route(
            "/scheduling/employees",
            get(handlers::scheduling::available_employees),
        )
        .route(
            "/scheduling/assignments",
            post(handlers::scheduling::create_assignment),
        )
        .route(
            "/scheduling/assignments/:id",
            put(handlers::scheduling::update_assignment)
                .delete(handlers::scheduling::delete_assignment),
        );

    let drafts = Router::new().route(
        "/drafts/:key",
        get(handlers::drafts::load_draft)
            .put(handlers::drafts::save_draft)
            .delete(handlers::drafts::clear_draft),
    );

    Router::new()
        .route("/status", get(api_status))
        .merge(customers)
        .merge(orders)
        .merge(measurements)
        .merge(work_orders)
        .merge(scheduling)
        .merge(drafts)
}

async fn api_status(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let git = option_env!("GIT_HASH").unwrap_or("unknown");
    let build_time = option_env!("BUILD_TIME").unwrap_or("unknown");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "git": git,
        "build_time": build_time,
        "service": "stoneworks-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": state.config.environment,
    });

    Ok(Json(ApiResponse::success(status_data)))
}

// Request logging middleware
pub async fn request_logging_middleware(
    request: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    tracing::info!(method = %method, uri = %uri, "Incoming request");

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = status.as_u16(),
        elapsed_ms = duration.as_millis() as u64,
        "Request completed"
    );

    response
}

pub mod prelude {
    pub use crate::db::*;
    pub use crate::errors::*;
    pub use crate::events::*;
    pub use crate::health::*;
    pub use crate::logging::*;
    pub use crate::openapi::*;
    pub use crate::services::*;
    pub use crate::tracing::*;
}
