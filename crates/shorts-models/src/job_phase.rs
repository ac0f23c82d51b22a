//! Job phases observed by the caller of the orchestrator.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Phase of the single live generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    /// No job has been started (or the last one was reset)
    #[default]
    Idle,
    /// Script and metadata are being generated
    Scripting,
    /// Video, voice-over and thumbnails are being generated concurrently
    MediaSynthesis,
    /// The result record is being assembled
    Assembling,
    /// Finished with a confidence at or above the threshold
    Completed,
    /// Finished, but the confidence requires a manual review
    NeedsReview,
    /// Aborted by a failure; dead end until reset
    Failed,
}

impl JobPhase {
    /// Get string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobPhase::Idle => "idle",
            JobPhase::Scripting => "scripting",
            JobPhase::MediaSynthesis => "media_synthesis",
            JobPhase::Assembling => "assembling",
            JobPhase::Completed => "completed",
            JobPhase::NeedsReview => "needs_review",
            JobPhase::Failed => "failed",
        }
    }

    /// Check if this is a terminal phase (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobPhase::Completed | JobPhase::NeedsReview | JobPhase::Failed
        )
    }

    /// Check if a job is currently being driven by the orchestrator.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            JobPhase::Scripting | JobPhase::MediaSynthesis | JobPhase::Assembling
        )
    }

    /// Idle and terminal phases admit a new job.
    pub fn accepts_new_job(&self) -> bool {
        !self.is_in_flight()
    }

    /// Check whether the orchestrator may move from `self` to `next`.
    ///
    /// Reset and job admission are handled separately by [`crate::Job`].
    pub fn can_advance_to(&self, next: JobPhase) -> bool {
        use JobPhase::*;
        matches!(
            (self, next),
            (Idle, Scripting)
                | (Scripting, MediaSynthesis)
                | (MediaSynthesis, Assembling)
                | (Assembling, Completed)
                | (Assembling, NeedsReview)
                | (Scripting, Failed)
                | (MediaSynthesis, Failed)
                | (Assembling, Failed)
        )
    }
}

impl std::fmt::Display for JobPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
