use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::entities::{employee, order, order_stage_assignment};
use crate::errors::ServiceError;
use crate::services::scheduling::{
    visible_assignments, AssignmentChanges, AssignmentFilters, CalendarData, NewAssignment,
    NormalizedOrder,
};
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CalendarQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub order_id: Option<i64>,
    /// Comma-separated employee names
    pub employees: Option<String>,
    /// Comma-separated stage statuses
    pub statuses: Option<String>,
}

fn split_csv(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Windowed calendar fetch, normalized into flat assignment/stage/order
/// collections. Optional filters narrow the assignments server-side; the
/// stage and order context collections come back unfiltered.
#[utoipa::path(
    get,
    path = "/api/v1/scheduling/calendar",
    summary = "Calendar window",
    params(
        ("from" = NaiveDate, Query, description = "First work date, inclusive"),
        ("to" = NaiveDate, Query, description = "Last work date, inclusive"),
        ("order_id" = Option<i64>, Query, description = "Keep assignments of one order"),
        ("employees" = Option<String>, Query, description = "Comma-separated employee names"),
        ("statuses" = Option<String>, Query, description = "Comma-separated stage statuses"),
    ),
    responses(
        (status = 200, description = "Calendar window retrieved", body = ApiResponse<CalendarData>),
        (status = 400, description = "Bad window parameters", body = crate::errors::ErrorResponse),
    )
)]
pub async fn calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<ApiResponse<CalendarData>>, ServiceError> {
    let svc = state.services.scheduling.clone();
    let mut data = svc.calendar_data(query.from, query.to).await?;

    let filters = AssignmentFilters {
        order_id: query.order_id,
        employee_names: split_csv(query.employees),
        statuses: split_csv(query.statuses),
    };
    if !filters.is_empty() {
        let orders_context = svc.working_orders_with_stages().await?;
        data.assignments =
            visible_assignments(&data.assignments, &data.stages, &orders_context, &filters);
    }

    Ok(Json(ApiResponse::success(data)))
}

/// Orders in the working state, available for new assignments.
#[utoipa::path(
    get,
    path = "/api/v1/scheduling/orders/available",
    summary = "Available orders",
    responses(
        (status = 200, description = "Orders retrieved", body = ApiResponse<Vec<order::Model>>),
    )
)]
pub async fn available_orders(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<order::Model>>>, ServiceError> {
    let orders = state.services.scheduling.available_orders().await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// Working orders with their details, flattened for the order pickers.
#[utoipa::path(
    get,
    path = "/api/v1/scheduling/orders/working",
    summary = "Working orders",
    responses(
        (status = 200, description = "Orders retrieved", body = ApiResponse<Vec<NormalizedOrder>>),
    )
)]
pub async fn working_orders(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<NormalizedOrder>>>, ServiceError> {
    let orders = state.services.scheduling.working_orders().await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// Crew roster for the assignment and filter dropdowns.
#[utoipa::path(
    get,
    path = "/api/v1/scheduling/employees",
    summary = "List employees",
    responses(
        (status = 200, description = "Employees retrieved", body = ApiResponse<Vec<employee::Model>>),
    )
)]
pub async fn available_employees(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<employee::Model>>>, ServiceError> {
    let employees = state.services.scheduling.available_employees().await?;
    Ok(Json(ApiResponse::success(employees)))
}

/// Put an employee on a stage for a day.
#[utoipa::path(
    post,
    path = "/api/v1/scheduling/assignments",
    summary = "Create assignment",
    request_body = NewAssignment,
    responses(
        (status = 201, description = "Assignment created", body = ApiResponse<order_stage_assignment::Model>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_assignment(
    State(state): State<AppState>,
    Json(request): Json<NewAssignment>,
) -> Result<(StatusCode, Json<ApiResponse<order_stage_assignment::Model>>), ServiceError> {
    let created = state.services.scheduling.create_assignment(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// Update an assignment; an empty change set returns the current row.
#[utoipa::path(
    put,
    path = "/api/v1/scheduling/assignments/{id}",
    summary = "Update assignment",
    params(("id" = i64, Path, description = "Assignment id")),
    request_body = AssignmentChanges,
    responses(
        (status = 200, description = "Assignment updated", body = ApiResponse<order_stage_assignment::Model>),
        (status = 404, description = "Assignment not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(changes): Json<AssignmentChanges>,
) -> Result<Json<ApiResponse<order_stage_assignment::Model>>, ServiceError> {
    let updated = state
        .services
        .scheduling
        .update_assignment(id, changes)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Take an employee off a stage.
#[utoipa::path(
    delete,
    path = "/api/v1/scheduling/assignments/{id}",
    summary = "Delete assignment",
    params(("id" = i64, Path, description = "Assignment id")),
    responses(
        (status = 204, description = "Assignment deleted"),
        (status = 404, description = "Assignment not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    state.services.scheduling.delete_assignment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
