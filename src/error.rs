//! HTTP-facing error type.
//!
//! Responses are plain text. Internal failures only ever carry their public
//! message; operator detail is logged where the failure happens.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use validator::ValidationErrors;

/// Seconds a client should wait before retrying a busy export.
const RETRY_AFTER_SECONDS: &str = "5";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Unavailable { message: String },

    #[error("{message}")]
    Internal { message: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            AppError::Unavailable { message } => (
                status,
                [(header::RETRY_AFTER, RETRY_AFTER_SECONDS)],
                message,
            )
                .into_response(),
            AppError::Validation { message } | AppError::Internal { message } => {
                (status, message).into_response()
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Invalid request".to_string());

        AppError::bad_request(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Deserialize, Validate)]
    struct Probe {
        #[validate(url(message = "Invalid URL"))]
        url: String,
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::bad_request("Missing URL").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::unavailable("busy").status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::internal("Failed to generate PDF").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unavailable_sets_retry_after() {
        let response = AppError::unavailable("busy").into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            RETRY_AFTER_SECONDS
        );
    }

    #[test]
    fn test_responses_are_plain_text() {
        let response = AppError::internal("Failed to generate PDF").into_response();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap();

        assert!(content_type.starts_with("text/plain"));
    }

    #[test]
    fn test_validation_errors_keep_field_message() {
        let probe = Probe {
            url: "not a url".to_string(),
        };
        let err: AppError = probe.validate().unwrap_err().into();

        assert!(matches!(err, AppError::Validation { ref message } if message == "Invalid URL"));
    }
}
