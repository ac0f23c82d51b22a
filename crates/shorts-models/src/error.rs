//! Failure taxonomy and state machine errors.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::JobPhase;

/// Message shown when the configured credential was rejected.
pub const CREDENTIAL_MESSAGE: &str =
    "Requested entity was not found. Please re-select your API key.";

/// Message shown when the script response could not be interpreted.
pub const PARSE_MESSAGE: &str = "Failed to parse script generation response.";

/// Message shown when the provider failed without actionable detail.
pub const PROVIDER_MESSAGE: &str =
    "Failed to generate video. Please verify your billing and API limits.";

/// Classification of a job failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The provider credential is missing or invalid; the user must re-select it
    Credential,
    /// The script response was not the expected structured shape
    Parse,
    /// Any other provider failure (rate limit, billing, transient fault)
    Provider,
    /// A call succeeded but returned no usable payload
    EmptyResponse,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Credential => "credential",
            FailureKind::Parse => "parse",
            FailureKind::Provider => "provider",
            FailureKind::EmptyResponse => "empty_response",
        }
    }

    /// Kind used for job bookkeeping.
    ///
    /// Empty responses are handled exactly like provider failures.
    pub fn effective(&self) -> FailureKind {
        match self {
            FailureKind::EmptyResponse => FailureKind::Provider,
            other => *other,
        }
    }

    /// True when the user has to pick a new credential before retrying.
    pub fn requires_credential(&self) -> bool {
        matches!(self, FailureKind::Credential)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error recorded on a failed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobFailure {
    /// Failure classification
    pub kind: FailureKind,
    /// Human-readable message for the front-end
    pub message: String,
}

impl JobFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn credential() -> Self {
        Self::new(FailureKind::Credential, CREDENTIAL_MESSAGE)
    }

    pub fn parse() -> Self {
        Self::new(FailureKind::Parse, PARSE_MESSAGE)
    }

    /// Provider failure, falling back to the billing/limits guidance when
    /// the provider gave no detail.
    pub fn provider(detail: Option<&str>) -> Self {
        let message = detail
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(PROVIDER_MESSAGE);
        Self::new(FailureKind::Provider, message)
    }

    /// Empty payload failure, recorded under the provider kind.
    pub fn empty_response(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::EmptyResponse.effective(), detail)
    }
}

impl std::fmt::Display for JobFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

/// Illegal job phase transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A job is already in flight (phase: {0})")]
    Busy(JobPhase),

    #[error("Illegal transition from {from} to {to}")]
    Illegal { from: JobPhase, to: JobPhase },

    #[error("Progress cannot go backwards ({current} -> {requested})")]
    ProgressRegression { current: u8, requested: u8 },
}

impl TransitionError {
    pub fn illegal(from: JobPhase, to: JobPhase) -> Self {
        Self::Illegal { from, to }
    }
}
