//! Progress events broadcast to front-end subscribers.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{FailureKind, Job, JobId, JobPhase};

/// Progress event envelope.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    /// Full job snapshot (sent first to new subscribers)
    Snapshot { job: Box<Job> },

    /// Phase or progress change
    Phase { phase: JobPhase, progress: u8 },

    /// Log message with timestamp
    Log {
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Job failed
    Failed {
        kind: FailureKind,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Job finished with a result
    Done {
        #[serde(rename = "jobId")]
        job_id: JobId,
        phase: JobPhase,
        confidence: f64,
    },

    /// Job was reset to idle
    Reset,
}

impl JobEvent {
    pub fn snapshot(job: &Job) -> Self {
        JobEvent::Snapshot {
            job: Box::new(job.clone()),
        }
    }

    pub fn phase(phase: JobPhase, progress: u8) -> Self {
        JobEvent::Phase { phase, progress }
    }

    pub fn log(message: impl Into<String>) -> Self {
        JobEvent::Log {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        JobEvent::Failed {
            kind,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn done(job_id: JobId, phase: JobPhase, confidence: f64) -> Self {
        JobEvent::Done {
            job_id,
            phase,
            confidence,
        }
    }

    /// Event type name, used for metrics labels.
    pub fn type_name(&self) -> &'static str {
        match self {
            JobEvent::Snapshot { .. } => "snapshot",
            JobEvent::Phase { .. } => "phase",
            JobEvent::Log { .. } => "log",
            JobEvent::Failed { .. } => "failed",
            JobEvent::Done { .. } => "done",
            JobEvent::Reset => "reset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(JobEvent::phase(JobPhase::MediaSynthesis, 25)).unwrap();
        assert_eq!(json["type"], "phase");
        assert_eq!(json["phase"], "media_synthesis");
        assert_eq!(json["progress"], 25);

        let json = serde_json::to_value(JobEvent::done(
            JobId::from_string("SH-AI-1234ABCD"),
            JobPhase::NeedsReview,
            0.5,
        ))
        .unwrap();
        assert_eq!(json["type"], "done");
        assert_eq!(json["jobId"], "SH-AI-1234ABCD");
    }
}
