//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use shorts_studio::StudioError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Credential required: {0}")]
    CredentialRequired(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Studio error: {0}")]
    Studio(StudioError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::CredentialRequired(_) => StatusCode::PRECONDITION_REQUIRED,
            ApiError::Internal(_) | ApiError::Studio(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code for the front-end.
    fn code(&self) -> Option<&'static str> {
        match self {
            ApiError::Conflict(_) => Some("job_in_progress"),
            ApiError::CredentialRequired(_) => Some("credential_required"),
            ApiError::BadRequest(_) => Some("invalid_request"),
            _ => None,
        }
    }
}

impl From<StudioError> for ApiError {
    fn from(err: StudioError) -> Self {
        match err {
            StudioError::Busy(phase) => {
                ApiError::Conflict(format!("A job is already in progress ({})", phase))
            }
            StudioError::CredentialRequired => {
                ApiError::CredentialRequired("Select an API key before generating".to_string())
            }
            other => ApiError::Studio(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let detail = match &self {
            ApiError::Internal(_) | ApiError::Studio(_) => {
                if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                    "An internal error occurred".to_string()
                } else {
                    self.to_string()
                }
            }
            ApiError::Conflict(msg)
            | ApiError::CredentialRequired(msg)
            | ApiError::BadRequest(msg)
            | ApiError::NotFound(msg) => msg.clone(),
        };

        let body = ErrorResponse {
            detail,
            code: self.code().map(str::to_string),
        };

        (status, Json(body)).into_response()
    }
}
