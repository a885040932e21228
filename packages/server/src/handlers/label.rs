use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::label::{CreateLabelRequest, LabelListResponse, LabelResponse};
use crate::registry::LabelRegistry;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Labels",
    operation_id = "listLabels",
    summary = "List all labels",
    description = "Returns every label ordered by name, case-insensitively.",
    responses(
        (status = 200, description = "All labels", body = LabelListResponse),
        (status = 500, description = "Storage failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_labels(
    State(state): State<AppState>,
) -> Result<Json<LabelListResponse>, AppError> {
    let labels = LabelRegistry::new(&state.db).list_labels().await?;

    Ok(Json(LabelListResponse {
        labels: labels.into_iter().map(LabelResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Labels",
    operation_id = "createLabel",
    summary = "Create a label",
    description = "Creates a label. The name is trimmed and must be non-empty and not already in use.",
    request_body = CreateLabelRequest,
    responses(
        (status = 201, description = "Label created", body = LabelResponse),
        (status = 400, description = "Invalid or duplicate name (VALIDATION_ERROR, LABEL_NAME_TAKEN)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_label(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateLabelRequest>,
) -> Result<impl IntoResponse, AppError> {
    let label = LabelRegistry::new(&state.db)
        .create_label(payload.name.as_deref())
        .await?;

    tracing::info!(label_id = label.id, name = %label.name, "Created label");
    Ok((StatusCode::CREATED, Json(LabelResponse::from(label))))
}
