// src/web/error.rs
// Centralized error handling for HTTP API responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::error::TestNotificationError;

/// Standard API error response format
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
    pub error_code: Option<String>,
}

impl ApiError {
    /// Create a new bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// Create a new not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// Create an error with a specific status and machine-readable code
    pub fn with_code(status_code: StatusCode, error_code: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code,
            error_code: Some(error_code.to_string()),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response_json = json!({
            "error": true,
            "message": self.message,
            "status": self.status_code.as_u16()
        });

        if let Some(error_code) = self.error_code {
            response_json["error_code"] = json!(error_code);
        }

        (self.status_code, Json(response_json)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(format!("decoding JSON arguments: {}", rejection.body_text()))
    }
}

impl From<TestNotificationError> for ApiError {
    fn from(err: TestNotificationError) -> Self {
        let code = match &err {
            TestNotificationError::Recipients(_) => "RECIPIENTS_FAILED",
            TestNotificationError::Delivery { .. } => "DELIVERY_FAILED",
        };
        ApiError::with_code(StatusCode::BAD_GATEWAY, code, err.to_string())
    }
}

/// Extension trait for Option<T> to create ApiError for None cases
pub trait IntoApiErrorOption<T> {
    fn ok_or_not_found(self, message: impl Into<String>) -> Result<T, ApiError>;
}

impl<T> IntoApiErrorOption<T> for Option<T> {
    fn ok_or_not_found(self, message: impl Into<String>) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::not_found(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotifyError;
    use crate::notify::RecipientSpec;

    #[test]
    fn test_api_error_creation() {
        let error = ApiError::bad_request("missing spec");
        assert_eq!(error.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(error.message, "missing spec");
        assert_eq!(error.error_code.as_deref(), Some("BAD_REQUEST"));
    }

    #[test]
    fn test_option_extensions() {
        let none_value: Option<i32> = None;
        let error = none_value.ok_or_not_found("Item not found").unwrap_err();
        assert_eq!(error.status_code, StatusCode::NOT_FOUND);
        assert_eq!(error.error_code.as_deref(), Some("NOT_FOUND"));
    }

    #[test]
    fn test_test_notification_codes() {
        let error: ApiError =
            TestNotificationError::Recipients(NotifyError::Recipients("x".into())).into();
        assert_eq!(error.status_code, StatusCode::BAD_GATEWAY);
        assert_eq!(error.error_code.as_deref(), Some("RECIPIENTS_FAILED"));

        let error: ApiError = TestNotificationError::Delivery {
            recipient: RecipientSpec::User(1),
            source: NotifyError::Email("y".into()),
        }
        .into();
        assert_eq!(error.error_code.as_deref(), Some("DELIVERY_FAILED"));
    }
}
