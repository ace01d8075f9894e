//! Error Types for the hive API
//!
//! This module defines error handling for the HTTP layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! Every error is rendered as JSON carrying the numeric HTTP status, the
//! error kind, and a human-readable message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hive_core::{MountError, StorageError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code and represents
/// a category of error that can occur while serving a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Authentication / Authorization Errors (401, 403, 405)
    // ========================================================================
    /// Request lacks a valid token
    Unauthorized,

    /// First path segment is not in the principal's ACL
    Forbidden,

    /// Principal's roles do not permit this HTTP method
    MethodNotAllowed,

    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request body or parameters could not be read
    InvalidInput,

    /// Required field is missing or blank
    MissingField,

    // ========================================================================
    // Not Found / Conflict (404, 409)
    // ========================================================================
    /// No item stored under the requested key
    EntityNotFound,

    /// An item is already stored under the requested key
    EntityAlreadyExists,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Stored value has a different shape than the handler expects
    DataError,

    /// Service is temporarily unavailable
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,

            ErrorCode::InvalidInput | ErrorCode::MissingField => StatusCode::BAD_REQUEST,

            ErrorCode::EntityNotFound => StatusCode::NOT_FOUND,
            ErrorCode::EntityAlreadyExists => StatusCode::CONFLICT,

            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError | ErrorCode::DataError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error returned by every handler and middleware.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (field errors etc.)
    pub details: Option<serde_json::Value>,
}

/// Wire shape of an error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Numeric HTTP status
    pub code: u16,

    /// Error kind
    pub error: ErrorCode,

    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    /// Render the response body.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            code: self.status_code().as_u16(),
            error: self.code,
            message: self.message.clone(),
            details: self.details.clone(),
        }
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn method_not_allowed(method: impl fmt::Display, segment: &str) -> Self {
        Self::new(
            ErrorCode::MethodNotAllowed,
            format!("Method {} not allowed on '{}'", method, segment),
        )
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a MissingField error.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    /// Create an EntityNotFound error.
    pub fn entity_not_found(kind: &str, key: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EntityNotFound,
            format!("{} '{}' not found", kind, key),
        )
    }

    /// Create an EntityAlreadyExists error.
    pub fn entity_already_exists(kind: &str, key: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EntityAlreadyExists,
            format!("{} '{}' already exists", kind, key),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn data_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DataError, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// 5xx responses are logged at error level, 4xx at debug level.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = %self.code, status = status.as_u16(), "{}", self.message);
        } else {
            tracing::debug!(code = %self.code, status = status.as_u16(), "{}", self.message);
        }
        (status, Json(self.body())).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::TypeMismatch { .. } => ApiError::data_error(err.to_string()),
            StorageError::Uninitialized { .. } => ApiError::internal_error(err.to_string()),
        }
    }
}

impl From<MountError> for ApiError {
    fn from(err: MountError) -> Self {
        ApiError::internal_error(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ErrorCode::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(ErrorCode::MissingField.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::EntityNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::EntityAlreadyExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::DataError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_constructors() {
        let err = ApiError::entity_not_found("Link", "sd");
        assert_eq!(err.code, ErrorCode::EntityNotFound);
        assert!(err.message.contains("Link"));
        assert!(err.message.contains("sd"));

        let err = ApiError::missing_field("url");
        assert_eq!(err.code, ErrorCode::MissingField);
        assert!(err.message.contains("url"));
    }

    #[test]
    fn test_body_carries_numeric_code() -> Result<(), serde_json::Error> {
        let err = ApiError::forbidden("access denied")
            .with_details(serde_json::json!({ "segment": "users" }));
        let json = serde_json::to_value(err.body())?;

        assert_eq!(json["code"], 403);
        assert_eq!(json["error"], "FORBIDDEN");
        assert_eq!(json["message"], "access denied");
        assert_eq!(json["details"]["segment"], "users");
        Ok(())
    }

    #[test]
    fn test_type_mismatch_is_data_error() {
        let err: ApiError = StorageError::TypeMismatch {
            key: "packages".to_string(),
            expected: "package list",
            found: "version",
        }
        .into();
        assert_eq!(err.code, ErrorCode::DataError);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_data_error_kind_is_distinct() -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(ApiError::data_error("bad").body())?;
        assert_eq!(json["error"], "DATA_ERROR");
        Ok(())
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::internal_error("boom");
        let display = format!("{}", err);
        assert!(display.contains("InternalError"));
        assert!(display.contains("boom"));
    }
}
