use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AttachLabelRequest {
    /// Label to attach. A positive integer, or a string holding one.
    #[schema(value_type = i32, example = 3)]
    pub label_id: Option<Value>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AttachLabelResponse {
    #[schema(example = "Label assigned successfully")]
    pub message: String,
    /// Id of the new image-label association.
    #[schema(example = 12)]
    pub annotation_id: i32,
}
