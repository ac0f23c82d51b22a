//! Orchestrator error types.

use thiserror::Error;

use shorts_gemini::GatewayError;
use shorts_models::{JobFailure, JobPhase, TransitionError};

pub type StudioResult<T> = Result<T, StudioError>;

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("A job is already in progress ({0})")]
    Busy(JobPhase),

    #[error("An API key must be selected before generating")]
    CredentialRequired,

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Generation failed: {0}")]
    Failed(JobFailure),

    #[error("Job state error: {0}")]
    Transition(TransitionError),
}

impl StudioError {
    /// Recorded job failure, if the job ran and failed.
    pub fn failure(&self) -> Option<&JobFailure> {
        match self {
            StudioError::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<TransitionError> for StudioError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Busy(phase) => StudioError::Busy(phase),
            other => StudioError::Transition(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_transition_maps_to_busy() {
        let err: StudioError = TransitionError::Busy(JobPhase::MediaSynthesis).into();
        assert!(matches!(err, StudioError::Busy(JobPhase::MediaSynthesis)));

        let err: StudioError = TransitionError::illegal(JobPhase::Idle, JobPhase::Assembling).into();
        assert!(matches!(err, StudioError::Transition(_)));
    }
}
