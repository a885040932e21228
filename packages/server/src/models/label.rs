use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::label;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateLabelRequest {
    #[schema(example = "cat")]
    pub name: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LabelResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "cat")]
    pub name: String,
    pub created_time: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LabelListResponse {
    pub labels: Vec<LabelResponse>,
}

impl From<label::Model> for LabelResponse {
    fn from(model: label::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            created_time: model.created_time,
        }
    }
}

/// Trim a label name, rejecting missing or blank names.
pub fn normalize_label_name(name: Option<&str>) -> Result<String, AppError> {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(AppError::Validation("Invalid label name".into())),
    }
}
