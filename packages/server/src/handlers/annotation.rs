use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::annotation::{AttachLabelRequest, AttachLabelResponse};
use crate::models::shared::{MessageResponse, parse_id, parse_json_id};
use crate::registry::AnnotationManager;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/labels",
    tag = "Image Labels",
    operation_id = "attachLabel",
    summary = "Attach a label to an image",
    description = "Associates an existing label with an existing image. Attaching a label that is already attached is rejected.",
    params(("id" = i32, Path, description = "Image ID")),
    request_body = AttachLabelRequest,
    responses(
        (status = 201, description = "Label attached", body = AttachLabelResponse),
        (status = 400, description = "Invalid image or label id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Image or label not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Label already attached (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn attach_label(
    State(state): State<AppState>,
    Path(raw_image_id): Path<String>,
    AppJson(payload): AppJson<AttachLabelRequest>,
) -> Result<impl IntoResponse, AppError> {
    let image_id = parse_id(&raw_image_id, "image")?;
    let label_id = parse_json_id(payload.label_id.as_ref(), "label")?;

    let annotation_id = AnnotationManager::new(&state.db)
        .attach_label(image_id, label_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AttachLabelResponse {
            message: "Label assigned successfully".into(),
            annotation_id,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/{id}/labels/{label_id}",
    tag = "Image Labels",
    operation_id = "detachLabel",
    summary = "Detach a label from an image",
    description = "Removes the association between an image and a label. Detaching a label that is not attached is rejected.",
    params(
        ("id" = i32, Path, description = "Image ID"),
        ("label_id" = i32, Path, description = "Label ID"),
    ),
    responses(
        (status = 200, description = "Label detached", body = MessageResponse),
        (status = 400, description = "Invalid image or label id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Image, label or association not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn detach_label(
    State(state): State<AppState>,
    Path((raw_image_id, raw_label_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    let image_id = parse_id(&raw_image_id, "image")?;
    let label_id = parse_id(&raw_label_id, "label")?;

    AnnotationManager::new(&state.db)
        .detach_label(image_id, label_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Label removed successfully".into(),
    }))
}
