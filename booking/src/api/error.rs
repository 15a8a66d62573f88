//! HTTP error mapping for the booking API.
//!
//! Bridges the engine's error taxonomy to JSON responses, keeping the
//! taxonomy's stable machine codes and HTTP status mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::BookingError;

/// Error surface of every API handler.
///
/// Wraps [`BookingError`] so handlers can use `?` on service calls and get
/// the taxonomy's code and status in the response body for free.
#[derive(Debug)]
pub struct ApiError(BookingError);

impl ApiError {
    /// Builds a validation error for boundary decode failures
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self(BookingError::validation(message))
    }
}

impl From<BookingError> for ApiError {
    fn from(error: BookingError) -> Self {
        Self(error)
    }
}

/// Error response body (JSON)
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Machine-readable code for client error handling
    code: &'static str,
    /// Human-readable message
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(code = self.0.code(), message = %self.0, "Request failed");
        }

        let body = ErrorBody {
            code: self.0.code(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors_map_to_client_statuses() {
        let response = ApiError::from(BookingError::not_found("event", "e-1")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::validation("phone must be exactly 10 digits").into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response =
            ApiError::from(BookingError::conflict("Event has been cancelled")).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn system_errors_map_to_server_statuses() {
        let response =
            ApiError::from(BookingError::Gateway("timeout".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response =
            ApiError::from(BookingError::Persistence("write failed".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
