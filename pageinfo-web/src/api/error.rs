//! API errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors returned by the navigation API
///
/// A locale that cannot be built is served as an empty tree, never as an error.
#[derive(Debug)]
pub enum ApiError {
    MissingParameter(&'static str),
    PageNotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingParameter(name) => {
                (StatusCode::BAD_REQUEST, format!("Missing parameter: {}", name))
            }
            ApiError::PageNotFound(what) => {
                (StatusCode::NOT_FOUND, format!("Page not found: {}", what))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Reject an absent or blank query parameter
pub fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::MissingParameter(name)),
    }
}
