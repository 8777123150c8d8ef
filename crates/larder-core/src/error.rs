//! Error types for larder.

use thiserror::Error;

/// Result type alias using larder's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for larder operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Entry not found in a collection
    #[error("Entry not found: {0}")]
    EntryNotFound(uuid::Uuid),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// CSV import failed
    #[error("CSV import error: {0}")]
    Csv(String),

    /// Authentication failed (no verified identity)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (authenticated but not authorized)
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("meals entry".to_string());
        assert_eq!(err.to_string(), "Not found: meals entry");
    }

    #[test]
    fn test_error_display_entry_not_found() {
        let id = Uuid::nil();
        let err = Error::EntryNotFound(id);
        assert_eq!(err.to_string(), format!("Entry not found: {}", id));
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("empty name".to_string());
        assert_eq!(err.to_string(), "Invalid input: empty name");
    }

    #[test]
    fn test_error_display_unauthorized() {
        let err = Error::Unauthorized("no session".to_string());
        assert_eq!(err.to_string(), "Unauthorized: no session");
    }

    #[test]
    fn test_error_display_forbidden() {
        let err = Error::Forbidden("not the admin".to_string());
        assert_eq!(err.to_string(), "Forbidden: not the admin");
    }

    #[test]
    fn test_error_display_csv() {
        let err = Error::Csv("missing columns: name".to_string());
        assert_eq!(err.to_string(), "CSV import error: missing columns: name");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
