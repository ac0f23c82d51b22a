//! The single live generation job and its state machine.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{GenerationResult, JobFailure, JobPhase, TransitionError};

/// Progress reported once a job has been admitted.
pub const PROGRESS_SCRIPTING: u8 = 5;
/// Progress reported once the script step succeeded.
pub const PROGRESS_MEDIA: u8 = 25;
/// Progress reported once all media branches joined.
pub const PROGRESS_ASSEMBLING: u8 = 85;
/// Progress reported once the result is assembled.
pub const PROGRESS_DONE: u8 = 100;

/// Human-scannable job identifier (`SH-AI-XXXXXXXX`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self(format!("SH-AI-{}", simple[..8].to_uppercase()))
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The generation job record.
///
/// Exactly one job is live at a time. All mutation goes through the
/// transition methods below, which keep `result` present only in
/// `Completed`/`NeedsReview` and `error` present only in `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Resolved topic of the current job
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    /// Upload time supplied by the caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_upload_time: Option<String>,

    /// Current phase
    pub phase: JobPhase,

    /// Progress (0-100), monotonic within a job
    pub progress: u8,

    /// Result, present once the job finished successfully
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GenerationResult>,

    /// Error, present only when failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobFailure>,

    /// When the current job was started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}

impl Job {
    /// Create an idle job record.
    pub fn new() -> Self {
        Self {
            topic: None,
            scheduled_upload_time: None,
            phase: JobPhase::Idle,
            progress: 0,
            result: None,
            error: None,
            started_at: None,
            updated_at: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn is_in_flight(&self) -> bool {
        self.phase.is_in_flight()
    }

    /// Admit a new job: Idle or terminal -> Scripting.
    ///
    /// Starting over a terminal job discards its result and error. While a
    /// job is in flight the record is left untouched.
    pub fn begin(
        &mut self,
        topic: impl Into<String>,
        scheduled_upload_time: impl Into<String>,
    ) -> Result<(), TransitionError> {
        if !self.phase.accepts_new_job() {
            return Err(TransitionError::Busy(self.phase));
        }

        let now = Utc::now();
        *self = Self {
            topic: Some(topic.into()),
            scheduled_upload_time: Some(scheduled_upload_time.into()),
            phase: JobPhase::Scripting,
            progress: PROGRESS_SCRIPTING,
            result: None,
            error: None,
            started_at: Some(now),
            updated_at: now,
        };
        Ok(())
    }

    /// Move to the next in-flight phase and raise progress.
    pub fn advance(&mut self, next: JobPhase, progress: u8) -> Result<(), TransitionError> {
        if next.is_terminal() || !self.phase.can_advance_to(next) {
            return Err(TransitionError::illegal(self.phase, next));
        }
        self.check_progress(progress)?;

        self.phase = next;
        self.progress = progress;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Raise progress without changing phase.
    pub fn set_progress(&mut self, progress: u8) -> Result<(), TransitionError> {
        if !self.is_in_flight() {
            return Err(TransitionError::illegal(self.phase, self.phase));
        }
        self.check_progress(progress)?;

        self.progress = progress;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Store the result and gate it on confidence: Assembling -> Completed
    /// when `confidence >= threshold`, Assembling -> NeedsReview otherwise.
    pub fn complete(
        &mut self,
        result: GenerationResult,
        threshold: f64,
    ) -> Result<JobPhase, TransitionError> {
        let next = if result.report.confidence < threshold {
            JobPhase::NeedsReview
        } else {
            JobPhase::Completed
        };
        if !self.phase.can_advance_to(next) {
            return Err(TransitionError::illegal(self.phase, next));
        }

        self.phase = next;
        self.progress = PROGRESS_DONE;
        self.result = Some(result);
        self.error = None;
        self.updated_at = Utc::now();
        Ok(next)
    }

    /// Abort the in-flight job. Progress keeps its last value.
    pub fn fail(&mut self, failure: JobFailure) -> Result<(), TransitionError> {
        if !self.phase.can_advance_to(JobPhase::Failed) {
            return Err(TransitionError::illegal(self.phase, JobPhase::Failed));
        }

        self.phase = JobPhase::Failed;
        self.result = None;
        self.error = Some(failure);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Return to Idle from Idle or a terminal phase, discarding the result,
    /// the error and the progress.
    pub fn reset(&mut self) -> Result<(), TransitionError> {
        if self.is_in_flight() {
            return Err(TransitionError::Busy(self.phase));
        }
        *self = Self::new();
        Ok(())
    }

    fn check_progress(&self, progress: u8) -> Result<(), TransitionError> {
        if progress < self.progress {
            return Err(TransitionError::ProgressRegression {
                current: self.progress,
                requested: progress,
            });
        }
        Ok(())
    }
}
