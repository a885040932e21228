use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::Serialize;

use crate::entity::{image, image_label, label};

/// Public URL of a stored upload.
pub fn upload_url(filename: &str) -> String {
    format!("/uploads/{filename}")
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadImageResponse {
    #[schema(example = 1)]
    pub image_id: i32,
    #[schema(example = "/uploads/5f0c3b8e6d0a4c7f9a1b2c3d4e5f6a7b.png")]
    pub url: String,
}

/// Row shape of the image list query.
#[derive(Debug, FromQueryResult)]
pub struct ImageListRow {
    pub id: i32,
    pub filename: String,
    pub file_size: i64,
    pub mime_type: String,
    pub upload_time: DateTime<Utc>,
    pub label_count: i64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ImageListItem {
    #[schema(example = 1)]
    pub id: i32,
    pub filename: String,
    #[schema(example = 142857)]
    pub file_size: i64,
    #[schema(example = "image/png")]
    pub mime_type: String,
    pub upload_time: DateTime<Utc>,
    /// Number of labels currently attached.
    #[schema(example = 2)]
    pub label_count: i64,
    pub url: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ImageListResponse {
    pub images: Vec<ImageListItem>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ImageResponse {
    #[schema(example = 1)]
    pub id: i32,
    pub filename: String,
    pub file_size: i64,
    pub mime_type: String,
    pub upload_time: DateTime<Utc>,
    pub url: String,
}

/// A label as attached to an image.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ImageLabelResponse {
    #[schema(example = 3)]
    pub label_id: i32,
    #[schema(example = "cat")]
    pub name: String,
    pub created_time: DateTime<Utc>,
    /// Id of the association row.
    #[schema(example = 12)]
    pub image_label_id: i32,
    pub annotation_time: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ImageDetailResponse {
    pub image: ImageResponse,
    pub labels: Vec<ImageLabelResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DeleteImageResponse {
    #[schema(example = true)]
    pub success: bool,
}

impl From<ImageListRow> for ImageListItem {
    fn from(row: ImageListRow) -> Self {
        Self {
            url: upload_url(&row.filename),
            id: row.id,
            filename: row.filename,
            file_size: row.file_size,
            mime_type: row.mime_type,
            upload_time: row.upload_time,
            label_count: row.label_count,
        }
    }
}

impl From<image::Model> for ImageResponse {
    fn from(model: image::Model) -> Self {
        Self {
            url: upload_url(&model.filename),
            id: model.id,
            filename: model.filename,
            file_size: model.file_size,
            mime_type: model.mime_type,
            upload_time: model.upload_time,
        }
    }
}

impl ImageLabelResponse {
    pub fn new(association: image_label::Model, label: label::Model) -> Self {
        Self {
            label_id: label.id,
            name: label.name,
            created_time: label.created_time,
            image_label_id: association.id,
            annotation_time: association.annotation_time,
        }
    }
}
