use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use common::storage::{BoxReader, UploadStore, generate_stored_filename};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::models::image::{
    DeleteImageResponse, ImageDetailResponse, ImageListItem, ImageListResponse, ImageResponse,
    UploadImageResponse, upload_url,
};
use crate::models::shared::parse_id;
use crate::registry::ImageRegistry;
use crate::state::AppState;

/// Fallback MIME type when neither the client nor the extension tells us.
const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Multipart field names accepted for the uploaded file.
const FILE_FIELDS: &[&str] = &["image", "file"];

/// Body limit for the upload route: the file limit plus room for multipart framing.
pub fn image_upload_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    let limit = max_upload_size.saturating_add(1024 * 1024);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

/// A file received from the client and persisted in the upload store.
struct ReceivedFile {
    filename: String,
    size: u64,
    original_name: Option<String>,
    content_type: Option<String>,
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Images",
    operation_id = "uploadImage",
    summary = "Upload an image",
    description = "Stores the uploaded file under a server-generated name and records its metadata. \
        The file is read from the `image` multipart field (`file` is accepted too).",
    request_body(content_type = "multipart/form-data", description = "Image file in the `image` field"),
    responses(
        (status = 200, description = "Image stored", body = UploadImageResponse),
        (status = 400, description = "Malformed upload or file too large (VALIDATION_ERROR)", body = ErrorBody),
        (status = 500, description = "No file uploaded or storage failure (UPLOAD_FAILED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadImageResponse>, AppError> {
    let mut received: Option<ReceivedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let is_file_field = field.name().is_some_and(|name| FILE_FIELDS.contains(&name));
        let has_filename = field.file_name().is_some_and(|name| !name.is_empty());
        if !is_file_field || !has_filename || received.is_some() {
            continue; // Ignore unknown fields and extra files.
        }

        let original_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let filename = generate_stored_filename(original_name.as_deref());
        let size = stream_field_to_store(
            field,
            &filename,
            &*state.uploads,
            state.config.storage.max_upload_size,
        )
        .await?;

        received = Some(ReceivedFile {
            filename,
            size,
            original_name,
            content_type,
        });
    }

    let file = received.ok_or_else(|| AppError::UploadFailed("No file uploaded".into()))?;
    let mime_type = resolve_mime_type(file.content_type.as_deref(), file.original_name.as_deref());
    let size = i64::try_from(file.size).unwrap_or(i64::MAX);

    let registry = ImageRegistry::new(&state.db, &*state.uploads);
    let image = match registry.create_image(&file.filename, size, &mime_type).await {
        Ok(image) => image,
        Err(e) => {
            // Nothing references the stored file now.
            if let Err(cleanup) = state.uploads.delete(&file.filename).await {
                warn!("Failed to remove orphaned upload {}: {}", file.filename, cleanup);
            }
            return Err(e);
        }
    };

    info!(image_id = image.id, filename = %image.filename, size, "Uploaded image");
    Ok(Json(UploadImageResponse {
        image_id: image.id,
        url: upload_url(&image.filename),
    }))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Images",
    operation_id = "listImages",
    summary = "List all images",
    description = "Returns every image, newest first, each with the number of labels attached to it.",
    responses(
        (status = 200, description = "All images", body = ImageListResponse),
        (status = 500, description = "Storage failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_images(
    State(state): State<AppState>,
) -> Result<Json<ImageListResponse>, AppError> {
    let rows = ImageRegistry::new(&state.db, &*state.uploads)
        .list_images()
        .await?;

    Ok(Json(ImageListResponse {
        images: rows.into_iter().map(ImageListItem::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Images",
    operation_id = "getImage",
    summary = "Get an image with its labels",
    description = "Returns the image metadata and all labels attached to it, ordered by name.",
    params(("id" = i32, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Image details", body = ImageDetailResponse),
        (status = 400, description = "Invalid image id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_image(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ImageDetailResponse>, AppError> {
    let id = parse_id(&raw_id, "image")?;

    let detail = ImageRegistry::new(&state.db, &*state.uploads)
        .get_image(id)
        .await?;

    Ok(Json(ImageDetailResponse {
        image: ImageResponse::from(detail.image),
        labels: detail.labels,
    }))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Images",
    operation_id = "deleteImage",
    summary = "Delete an image",
    description = "Deletes the image, every label association it has, and its stored file.",
    params(("id" = i32, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Image deleted", body = DeleteImageResponse),
        (status = 400, description = "Invalid image id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_image(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<DeleteImageResponse>, AppError> {
    let id = parse_id(&raw_id, "image")?;

    ImageRegistry::new(&state.db, &*state.uploads)
        .delete_image(id)
        .await?;

    Ok(Json(DeleteImageResponse { success: true }))
}

/// Pick the MIME type to record for an upload.
fn resolve_mime_type(declared: Option<&str>, original_name: Option<&str>) -> String {
    if let Some(declared) = declared.map(str::trim)
        && !declared.is_empty()
        && declared != "application/octet-stream"
    {
        return declared.to_string();
    }

    original_name
        .and_then(|name| mime_guess::from_path(name).first())
        .map(|m| m.to_string())
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string())
}

/// Stream a multipart field to the upload store via a temp file.
async fn stream_field_to_store(
    mut field: axum::extract::multipart::Field<'_>,
    filename: &str,
    uploads: &dyn UploadStore,
    max_size: u64,
) -> Result<u64, AppError> {
    let temp_path = std::env::temp_dir().join(format!("labeler-upload-{}", Uuid::new_v4()));

    let result = async {
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::UploadFailed(format!("Failed to create temp file: {e}")))?;

        let mut total_size: u64 = 0;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
        {
            total_size += chunk.len() as u64;
            if total_size > max_size {
                return Err(AppError::Validation(format!(
                    "File exceeds maximum size of {max_size} bytes"
                )));
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::UploadFailed(format!("Temp file write failed: {e}")))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::UploadFailed(format!("Temp file flush failed: {e}")))?;
        drop(temp_file);

        let file = tokio::fs::File::open(&temp_path)
            .await
            .map_err(|e| AppError::UploadFailed(format!("Failed to reopen temp file: {e}")))?;
        let reader: BoxReader = Box::new(file);
        let written = uploads.put_stream(filename, reader).await.map_err(|e| match e {
            common::storage::StorageError::SizeLimitExceeded { .. } => AppError::from(e),
            other => AppError::UploadFailed(other.to_string()),
        })?;

        Ok(written)
    }
    .await;

    // Best effort.
    let _ = tokio::fs::remove_file(&temp_path).await;

    result
}
