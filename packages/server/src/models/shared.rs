use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

/// Generic `{ "message": ... }` response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Label removed successfully")]
    pub message: String,
}

/// Parse a positive integer id from a path segment.
pub fn parse_id(raw: &str, name: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::Validation(format!("Invalid {name} id")))
}

/// Parse a positive integer id from a JSON value.
///
/// Integral numbers and strings holding an integer are accepted.
pub fn parse_json_id(value: Option<&Value>, name: &str) -> Result<i32, AppError> {
    let invalid = || AppError::Validation(format!("Invalid {name} id"));
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|id| i32::try_from(id).ok())
            .filter(|id| *id > 0)
            .ok_or_else(invalid),
        Some(Value::String(s)) => parse_id(s, name),
        _ => Err(invalid()),
    }
}
