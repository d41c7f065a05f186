use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::Value as JsonValue;

use crate::entities::draft;
use crate::errors::ServiceError;
use crate::{ApiResponse, AppState};

/// Load the autosaved draft under a key.
#[utoipa::path(
    get,
    path = "/api/v1/drafts/{key}",
    summary = "Load draft",
    params(("key" = String, Path, description = "Draft key, e.g. workOrderDraft")),
    responses(
        (status = 200, description = "Draft found", body = ApiResponse<draft::Model>),
        (status = 404, description = "No draft under that key", body = crate::errors::ErrorResponse),
    )
)]
pub async fn load_draft(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<draft::Model>>, ServiceError> {
    let found = state.services.drafts.load_draft(&key).await?;
    Ok(Json(ApiResponse::success(found)))
}

/// Save (or overwrite) the draft under a key. The body is stored verbatim.
#[utoipa::path(
    put,
    path = "/api/v1/drafts/{key}",
    summary = "Save draft",
    params(("key" = String, Path, description = "Draft key")),
    responses(
        (status = 200, description = "Draft saved", body = ApiResponse<draft::Model>),
        (status = 400, description = "Blank key", body = crate::errors::ErrorResponse),
    )
)]
pub async fn save_draft(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(payload): Json<JsonValue>,
) -> Result<Json<ApiResponse<draft::Model>>, ServiceError> {
    let saved = state.services.drafts.save_draft(&key, payload).await?;
    Ok(Json(ApiResponse::success(saved)))
}

/// Clear the draft under a key. Clearing an absent draft still succeeds.
#[utoipa::path(
    delete,
    path = "/api/v1/drafts/{key}",
    summary = "Clear draft",
    params(("key" = String, Path, description = "Draft key")),
    responses(
        (status = 204, description = "Draft cleared (or was already absent)"),
    )
)]
pub async fn clear_draft(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ServiceError> {
    state.services.drafts.clear_draft(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}
