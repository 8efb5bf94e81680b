//! HTTP mapping of `EventHubError`

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use crate::utils::errors::EventHubError;
use crate::utils::helpers::{date_format, now};
use chrono::NaiveDateTime;

/// Error response body (JSON)
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: String,
    pub reason: String,
    pub message: String,
    pub errors: Vec<String>,
    #[serde(with = "date_format")]
    pub timestamp: NaiveDateTime,
}

impl EventHubError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EventHubError::Validation(_) | EventHubError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            EventHubError::NotFound { .. } => StatusCode::NOT_FOUND,
            EventHubError::Conflict(_) => StatusCode::CONFLICT,
            EventHubError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            EventHubError::Validation(_) | EventHubError::InvalidInput(_) => "Incorrectly made request.",
            EventHubError::NotFound { .. } => "The required object was not found.",
            EventHubError::Conflict(_) => "For the requested operation the conditions are not met.",
            EventHubError::ServiceUnavailable(_) => "Service is temporarily unavailable.",
            _ => "Internal server error.",
        }
    }

    /// Body sent to the client; internal details stay in the logs
    pub fn to_api_error(&self) -> ApiError {
        let status = self.status_code();
        let message = match self {
            EventHubError::Validation(_)
            | EventHubError::InvalidInput(_)
            | EventHubError::NotFound { .. }
            | EventHubError::Conflict(_)
            | EventHubError::ServiceUnavailable(_)
            | EventHubError::Persistence(_) => self.to_string(),
            _ => "An internal error occurred".to_string(),
        };
        let errors = match self {
            EventHubError::Validation(fields) => fields.iter().map(ToString::to_string).collect(),
            _ => Vec::new(),
        };

        ApiError {
            status: status
                .canonical_reason()
                .unwrap_or("UNKNOWN")
                .to_uppercase()
                .replace(' ', "_"),
            reason: self.reason().to_string(),
            message,
            errors,
            timestamp: now(),
        }
    }
}

impl IntoResponse for EventHubError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = %status, severity = %self.severity(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }

        (status, Json(self.to_api_error())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::FieldError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(EventHubError::validation("name", "blank").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(EventHubError::not_found("User", 1).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(EventHubError::conflict("taken").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            EventHubError::Persistence("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_body() {
        let err = EventHubError::Validation(vec![FieldError::new("name", "must not be blank")]);
        let body = err.to_api_error();
        assert_eq!(body.status, "BAD_REQUEST");
        assert_eq!(body.errors, vec!["Field: name. Error: must not be blank".to_string()]);

        let conflict = EventHubError::conflict("The category is not empty").to_api_error();
        assert_eq!(conflict.status, "CONFLICT");
        assert_eq!(conflict.message, "The category is not empty");
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let body = EventHubError::Config("secret dsn".into()).to_api_error();
        assert_eq!(body.status, "INTERNAL_SERVER_ERROR");
        assert!(!body.message.contains("secret"));
    }
}
