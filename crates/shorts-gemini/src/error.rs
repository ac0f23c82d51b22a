//! Gateway error types.

use serde::Deserialize;
use thiserror::Error;

use shorts_models::FailureKind;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors that can occur while talking to the generative provider.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Credential rejected: {0}")]
    Credential(String),

    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("Provider error: {message}")]
    Provider { status: Option<u16>, message: String },

    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("Video generation still running after {attempts} status checks")]
    PollTimeout { attempts: u32 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Provider message signalling that the key does not resolve to an entity.
const ENTITY_NOT_FOUND: &str = "Requested entity was not found";

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// Error object returned by the provider.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl GatewayError {
    pub fn credential(msg: impl Into<String>) -> Self {
        Self::Credential(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider {
            status: None,
            message: msg.into(),
        }
    }

    pub fn empty_response(msg: impl Into<String>) -> Self {
        Self::EmptyResponse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Classify a non-success HTTP response.
    ///
    /// 401/403, "entity not found" 404s and invalid-key 400s all mean the
    /// configured key is unusable.
    pub fn from_http_status(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
        let message = parsed
            .as_ref()
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| body.trim().to_string());

        if is_credential_failure(status, &message, parsed.as_ref().and_then(|e| e.status.as_deref())) {
            return Self::Credential(message);
        }

        Self::Provider {
            status: Some(status),
            message,
        }
    }

    /// Classify an error object embedded in a finished long-running operation.
    pub(crate) fn from_operation_error(body: &ErrorBody) -> Self {
        let message = body
            .message
            .clone()
            .unwrap_or_else(|| "Video generation failed".to_string());
        let code = body.code.unwrap_or(500);

        // Operation errors carry gRPC codes, so match the entity message directly.
        if message.contains(ENTITY_NOT_FOUND)
            || is_credential_failure(code, &message, body.status.as_deref())
        {
            return Self::Credential(message);
        }

        Self::Provider {
            status: Some(code),
            message,
        }
    }

    /// Failure classification used by the orchestrator.
    pub fn kind(&self) -> FailureKind {
        match self {
            GatewayError::Credential(_) => FailureKind::Credential,
            GatewayError::Parse(_) => FailureKind::Parse,
            GatewayError::EmptyResponse(_) => FailureKind::EmptyResponse,
            GatewayError::Provider { .. }
            | GatewayError::PollTimeout { .. }
            | GatewayError::Config(_)
            | GatewayError::Network(_)
            | GatewayError::Io(_) => FailureKind::Provider,
        }
    }

    /// Provider-supplied detail worth showing to the user, if any.
    pub fn detail(&self) -> Option<String> {
        match self {
            GatewayError::Provider { message, .. } => {
                let trimmed = message.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            GatewayError::EmptyResponse(msg) => Some(msg.clone()),
            GatewayError::PollTimeout { .. } => Some(self.to_string()),
            _ => None,
        }
    }

    /// HTTP status reported by the provider, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            GatewayError::Provider { status, .. } => *status,
            GatewayError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn is_credential_failure(status: u16, message: &str, status_name: Option<&str>) -> bool {
    match status {
        401 | 403 => true,
        404 => message.contains(ENTITY_NOT_FOUND),
        400 => {
            message.contains("API key not valid")
                || message.contains("API_KEY_INVALID")
                || status_name == Some("UNAUTHENTICATED")
        }
        _ => status_name == Some("UNAUTHENTICATED") || status_name == Some("PERMISSION_DENIED"),
    }
}
