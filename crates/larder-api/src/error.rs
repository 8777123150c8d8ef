//! Error-to-response mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// API-facing error. Every repository error collapses into one of these and
/// surfaces as a JSON `{"error": ...}` body with the matching status code.
#[derive(Debug)]
pub enum ApiError {
    Database(larder_core::Error),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
}

impl From<larder_core::Error> for ApiError {
    fn from(err: larder_core::Error) -> Self {
        match &err {
            larder_core::Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            larder_core::Error::EntryNotFound(id) => {
                ApiError::NotFound(format!("Entry not found: {}", id))
            }
            larder_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            larder_core::Error::Unauthorized(msg) => ApiError::Unauthorized(msg.clone()),
            larder_core::Error::Forbidden(msg) => ApiError::Forbidden(msg.clone()),
            _ => ApiError::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Database(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_entry_not_found_maps_to_404() {
        let err: ApiError = larder_core::Error::EntryNotFound(uuid::Uuid::nil()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_input_maps_to_400() {
        let err: ApiError = larder_core::Error::InvalidInput("bad".into()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_other_errors_collapse_to_500() {
        let err: ApiError = larder_core::Error::Serialization("oops".into()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
