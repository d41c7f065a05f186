use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::entities::{order_detail, order_stage};
use crate::errors::ServiceError;
use crate::services::work_orders::{
    AttachImageRequest, ConvertToWorkOrderRequest, ConvertedWorkOrder, CreateWorkOrderRequest,
    UpdateStageRequest, UpdateWorkOrderRequest,
};
use crate::{ApiResponse, AppState, ListQuery, PaginatedResponse};

/// List work-order details, most recently touched first.
#[utoipa::path(
    get,
    path = "/api/v1/work-orders",
    summary = "List work orders",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Work orders retrieved", body = ApiResponse<PaginatedResponse<order_detail::Model>>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_work_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<order_detail::Model>>>, ServiceError> {
    let svc = state.services.work_orders.clone();
    let limit = query.limit.max(1);
    let offset = query.page.saturating_sub(1) * limit;
    let items = svc.list_work_orders(limit, offset).await?;
    let total = svc.count_work_orders().await?;
    let total_pages = (total + limit - 1) / limit;
    Ok(Json(ApiResponse::success(PaginatedResponse {
        items,
        total,
        page: query.page,
        limit,
        total_pages,
    })))
}

/// Create a production detail plus its stage pipeline for an existing order.
#[utoipa::path(
    post,
    path = "/api/v1/work-orders",
    summary = "Create work order",
    request_body = CreateWorkOrderRequest,
    responses(
        (status = 201, description = "Work order created", body = ApiResponse<order_detail::Model>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_work_order(
    State(state): State<AppState>,
    Json(request): Json<CreateWorkOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<order_detail::Model>>), ServiceError> {
    let created = state.services.work_orders.create_work_order(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// Fetch one work-order detail
#[utoipa::path(
    get,
    path = "/api/v1/work-orders/{id}",
    summary = "Get work order",
    params(("id" = i64, Path, description = "Detail id")),
    responses(
        (status = 200, description = "Work order found", body = ApiResponse<order_detail::Model>),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_work_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<order_detail::Model>>, ServiceError> {
    let found = state.services.work_orders.get_work_order(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

/// Update a work-order detail; absent fields keep their stored values.
#[utoipa::path(
    put,
    path = "/api/v1/work-orders/{id}",
    summary = "Update work order",
    params(("id" = i64, Path, description = "Detail id")),
    request_body = UpdateWorkOrderRequest,
    responses(
        (status = 200, description = "Work order updated", body = ApiResponse<order_detail::Model>),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_work_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateWorkOrderRequest>,
) -> Result<Json<ApiResponse<order_detail::Model>>, ServiceError> {
    let updated = state
        .services
        .work_orders
        .update_work_order(id, request)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Production stages for one detail, in creation order.
#[utoipa::path(
    get,
    path = "/api/v1/work-orders/{id}/stages",
    summary = "List a work order's stages",
    params(("id" = i64, Path, description = "Detail id")),
    responses(
        (status = 200, description = "Stages retrieved", body = ApiResponse<Vec<order_stage::Model>>),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_work_order_stages(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<order_stage::Model>>>, ServiceError> {
    let stages = state.services.work_orders.get_stages(id).await?;
    Ok(Json(ApiResponse::success(stages)))
}

/// Update one stage; status changes must stay inside the closed status set.
#[utoipa::path(
    put,
    path = "/api/v1/stages/{id}",
    summary = "Update stage",
    params(("id" = i64, Path, description = "Stage id")),
    request_body = UpdateStageRequest,
    responses(
        (status = 200, description = "Stage updated", body = ApiResponse<order_stage::Model>),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse),
        (status = 404, description = "Stage not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_stage(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateStageRequest>,
) -> Result<Json<ApiResponse<order_stage::Model>>, ServiceError> {
    let updated = state.services.work_orders.update_stage(id, request).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Record an uploaded image on a work-order detail as a placeholder URL.
#[utoipa::path(
    post,
    path = "/api/v1/work-orders/{id}/image",
    summary = "Attach image",
    params(("id" = i64, Path, description = "Detail id")),
    request_body = AttachImageRequest,
    responses(
        (status = 200, description = "Image recorded", body = ApiResponse<order_detail::Model>),
        (status = 400, description = "Blank file name", body = crate::errors::ErrorResponse),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn attach_work_order_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AttachImageRequest>,
) -> Result<Json<ApiResponse<order_detail::Model>>, ServiceError> {
    let updated = state
        .services
        .work_orders
        .attach_image(id, &request.file_name)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Convert a sale into a work order: order to `working`, measurements
/// replaced, detail plus stage pipeline created, totals computed.
#[utoipa::path(
    post,
    path = "/api/v1/work-orders/convert",
    summary = "Convert sale to work order",
    request_body = ConvertToWorkOrderRequest,
    responses(
        (status = 201, description = "Conversion completed", body = ApiResponse<ConvertedWorkOrder>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order or customer not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn convert_to_work_order(
    State(state): State<AppState>,
    Json(request): Json<ConvertToWorkOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ConvertedWorkOrder>>), ServiceError> {
    let converted = state
        .services
        .work_orders
        .convert_to_work_order(request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(converted))))
}
