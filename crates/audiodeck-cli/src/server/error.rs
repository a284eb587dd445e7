//! Mapping of domain errors onto HTTP responses.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use audiodeck_core::error::{SubmitError, TrimError};

/// Error body: `{error, reason, details?}`, plus `{duration, maxDuration}`
/// for `too_long`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    reason: &'static str,
    details: Option<String>,
    limit: Option<(u64, u64)>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    reason: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_duration: Option<u64>,
}

impl ApiError {
    fn new(status: StatusCode, reason: &'static str, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            reason,
            details: None,
            limit: None,
        }
    }

    fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }

    pub fn payload_too_large(cap: u64) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "too_large",
            format!("File too large. The limit is {} MB.", cap / (1024 * 1024)),
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (duration, max_duration) = match self.limit {
            Some((d, m)) => (Some(d), Some(m)),
            None => (None, None),
        };
        let body = Json(ErrorBody {
            error: self.error,
            reason: self.reason,
            details: self.details,
            duration,
            max_duration,
        });
        (self.status, body).into_response()
    }
}

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        let reason = err.reason();
        let message = err.to_string();
        match err {
            SubmitError::Validation(details) => {
                Self::new(StatusCode::BAD_REQUEST, reason, message).with_details(details)
            }
            SubmitError::DurationExceeded {
                duration,
                max_duration,
            } => {
                let mut e = Self::new(StatusCode::UNPROCESSABLE_ENTITY, reason, message);
                e.limit = Some((duration, max_duration));
                e
            }
            SubmitError::Extraction(e) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, reason, message)
                    .with_details(e.details())
            }
            SubmitError::Io(e) => {
                tracing::error!(error = %e, "submission failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, reason, message)
            }
        }
    }
}

impl From<TrimError> for ApiError {
    fn from(err: TrimError) -> Self {
        let reason = err.reason();
        let message = err.to_string();
        match err {
            TrimError::Validation(_) => Self::new(StatusCode::BAD_REQUEST, reason, message),
            TrimError::SourceMissing(_) => Self::new(StatusCode::NOT_FOUND, reason, message),
            TrimError::Tool(e) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, reason, "Trim failed")
                    .with_details(e.diagnostic)
            }
            TrimError::Io(e) => {
                tracing::error!(error = %e, "trim failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, reason, message)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("Invalid request body").with_details(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::new(StatusCode::PAYLOAD_TOO_LARGE, "too_large", "File too large.");
        }
        Self::bad_request("Malformed upload").with_details(err.body_text())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("request failed: {:#}", err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", "Internal server error")
            .with_details(format!("{:#}", err))
    }
}
