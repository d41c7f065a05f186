use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::entities::{measurement, order};
use crate::errors::ServiceError;
use crate::services::orders::{CreateOrderRequest, UpdateOrderRequest};
use crate::{ApiResponse, AppState, ListQuery, PaginatedResponse};

/// List orders, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    summary = "List orders",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Orders retrieved", body = ApiResponse<PaginatedResponse<order::Model>>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<order::Model>>>, ServiceError> {
    let svc = state.services.orders.clone();
    let limit = query.page_size(&state.config);
    let offset = query.page.saturating_sub(1) * limit;
    let items = svc.list_orders(limit, offset).await?;
    let total = svc.count_orders().await?;
    let total_pages = (total + limit - 1) / limit;
    Ok(Json(ApiResponse::success(PaginatedResponse {
        items,
        total,
        page: query.page,
        limit,
        total_pages,
    })))
}

/// Sale-order intake: customer upsert, coded order row, measurement lines.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    summary = "Create order",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<order::Model>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<order::Model>>), ServiceError> {
    let created = state.services.orders.create_order(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// Fetch one order
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    summary = "Get order",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order found", body = ApiResponse<order::Model>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<order::Model>>, ServiceError> {
    let found = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

/// Update an order; absent fields keep their stored values. The order code is
/// never regenerated here.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}",
    summary = "Update order",
    params(("id" = i64, Path, description = "Order id")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = ApiResponse<order::Model>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<Json<ApiResponse<order::Model>>, ServiceError> {
    let updated = state.services.orders.update_order(id, request).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Delete an order and its measurements.
#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    summary = "Delete order",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    state.services.orders.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Measurement lines for one order, in insertion order.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/measurements",
    summary = "List an order's measurements",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Measurements retrieved", body = ApiResponse<Vec<measurement::Model>>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_order_measurements(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<measurement::Model>>>, ServiceError> {
    // 404 on an unknown order rather than an empty list
    state.services.orders.get_order(id).await?;
    let rows = state.services.measurements.list_for_order(id).await?;
    Ok(Json(ApiResponse::success(rows)))
}
