//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Standard API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    /// Non-fatal problems, e.g. attachments that could not be stored.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    /// Create a success response carrying warnings.
    pub const fn with_warnings(data: T, warnings: Vec<String>) -> Self {
        Self { data, warnings }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_omitted_when_empty() {
        let body = serde_json::to_value(ApiResponse::ok(1)).unwrap();
        assert_eq!(body, serde_json::json!({ "data": 1 }));

        let body =
            serde_json::to_value(ApiResponse::with_warnings(1, vec!["x".to_string()])).unwrap();
        assert_eq!(body["warnings"][0], "x");
    }
}
