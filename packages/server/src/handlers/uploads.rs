use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use common::storage::validate_flat_filename;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Stream a stored image file back to the client.
#[instrument(skip(state))]
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let filename =
        validate_flat_filename(&filename).map_err(|e| AppError::Validation(e.message().into()))?;

    let size = state.uploads.size(filename).await?;
    let reader = state.uploads.get_stream(filename).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let mime = mime_guess::from_path(filename).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
