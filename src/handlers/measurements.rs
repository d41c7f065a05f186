use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::entities::measurement;
use crate::errors::ServiceError;
use crate::services::measurements::{CreateMeasurementRequest, UpdateMeasurementRequest};
use crate::{ApiResponse, AppState};

/// Add a measurement line to an order. `total_cost` is derived server-side.
#[utoipa::path(
    post,
    path = "/api/v1/measurements",
    summary = "Create measurement",
    request_body = CreateMeasurementRequest,
    responses(
        (status = 201, description = "Measurement created", body = ApiResponse<measurement::Model>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_measurement(
    State(state): State<AppState>,
    Json(request): Json<CreateMeasurementRequest>,
) -> Result<(StatusCode, Json<ApiResponse<measurement::Model>>), ServiceError> {
    let created = state.services.measurements.create_measurement(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// Update a measurement; `total_cost` is recomputed from the effective
/// quantity and cost whichever of the two the request carries.
#[utoipa::path(
    put,
    path = "/api/v1/measurements/{id}",
    summary = "Update measurement",
    params(("id" = i64, Path, description = "Measurement id")),
    request_body = UpdateMeasurementRequest,
    responses(
        (status = 200, description = "Measurement updated", body = ApiResponse<measurement::Model>),
        (status = 404, description = "Measurement not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_measurement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateMeasurementRequest>,
) -> Result<Json<ApiResponse<measurement::Model>>, ServiceError> {
    let updated = state
        .services
        .measurements
        .update_measurement(id, request)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Delete a measurement
#[utoipa::path(
    delete,
    path = "/api/v1/measurements/{id}",
    summary = "Delete measurement",
    params(("id" = i64, Path, description = "Measurement id")),
    responses(
        (status = 204, description = "Measurement deleted"),
        (status = 404, description = "Measurement not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_measurement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    state.services.measurements.delete_measurement(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
