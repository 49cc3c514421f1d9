//! screenzen-server/src/error.rs
//!
//! Maps core errors onto the HTTP JSON envelope. Every handler boundary
//! converts here; no error crosses a request uncaught.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use screenzen_core::Error;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        let (status, label) = match &err {
            Error::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "Validation failed"),
            Error::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "Invalid request"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
            Error::Extraction(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to analyze image"),
            Error::Prediction(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to analyze data"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };
        if status.is_server_error() {
            error!("request failed: {}", message);
        }
        ApiError::new(status, label, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": self.error,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_maps_to_401() {
        let api = ApiError::from(Error::Unauthenticated("no token provided".into()));
        assert_eq!(api.status, StatusCode::UNAUTHORIZED);
        assert_eq!(api.error, "Unauthorized");
    }

    #[test]
    fn validation_and_invalid_argument_map_to_400() {
        let api = ApiError::from(Error::Validation("missing field".into()));
        assert_eq!(api.status, StatusCode::BAD_REQUEST);

        let api = ApiError::from(Error::InvalidArgument("task index".into()));
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let api = ApiError::from(Error::NotFound("log".into()));
        assert_eq!(api.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn pipeline_failures_map_to_500() {
        let api = ApiError::from(Error::Extraction("no JSON".into()));
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "Failed to analyze image");

        let api = ApiError::from(Error::Prediction("503".into()));
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "Failed to analyze data");
    }

    #[test]
    fn envelope_shape_is_success_error_message() {
        let api = ApiError::new(StatusCode::BAD_REQUEST, "Validation failed", "missing field");
        let response = api.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
