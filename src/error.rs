//! Service error types with HTTP status code mapping.
//!
//! [`AnalyticsError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Failures of the external stats API are *not* represented here: they are
//! absorbed by the fetch layer (see [`crate::fetch::FetchError`]) and degrade
//! to empty results before reaching the orchestrator.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "player not tracked: #2PP",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status               |
/// |-----------|-----------------|---------------------------|
/// | 1000-1999 | Validation      | 400 Bad Request           |
/// | 2000-2999 | Not Found       | 404 Not Found             |
/// | 3000-3999 | Server          | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// The supplied player tag is malformed.
    #[error("invalid player tag: {0}")]
    InvalidTag(String),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The external stats API does not know this player (or could not be
    /// reached), so it cannot be tracked.
    #[error("could not track player {0}; check the tag and try again")]
    PlayerUnavailable(String),

    /// The player is not tracked in storage.
    #[error("player not tracked: {0}")]
    PlayerNotFound(String),

    /// Storage layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AnalyticsError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidTag(_) => 1001,
            Self::InvalidRequest(_) => 1002,
            Self::PlayerUnavailable(_) => 1003,
            Self::PlayerNotFound(_) => 2001,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidTag(_) | Self::InvalidRequest(_) | Self::PlayerUnavailable(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::PlayerNotFound(_) => StatusCode::NOT_FOUND,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` when the error means "this player is not tracked".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::PlayerNotFound(_))
    }
}

impl From<sqlx::Error> for AnalyticsError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AnalyticsError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = AnalyticsError::PlayerNotFound("#2PP".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), 2001);
        assert!(err.is_not_found());
    }

    #[test]
    fn unavailable_is_a_client_error_not_a_not_found() {
        let err = AnalyticsError::PlayerUnavailable("#2PP".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("#2PP"));
    }

    #[test]
    fn persistence_maps_to_500() {
        let err = AnalyticsError::PersistenceError("connection reset".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), 3001);
    }

    #[test]
    fn into_response_carries_status() {
        let response = AnalyticsError::InvalidTag("??".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
