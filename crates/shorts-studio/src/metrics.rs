//! Job metrics.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_STARTED_TOTAL: &str = "shorts_jobs_started_total";
    pub const JOBS_REJECTED_TOTAL: &str = "shorts_jobs_rejected_total";
    pub const JOBS_COMPLETED_TOTAL: &str = "shorts_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "shorts_jobs_failed_total";
    pub const STEP_DURATION_SECONDS: &str = "shorts_step_duration_seconds";
}

pub fn record_job_started() {
    counter!(names::JOBS_STARTED_TOTAL).increment(1);
}

/// Record a refused admission (`busy` or `credential`).
pub fn record_job_rejected(reason: &str) {
    let labels = [("reason", reason.to_string())];
    counter!(names::JOBS_REJECTED_TOTAL, &labels).increment(1);
}

/// Record a finished job by its gated outcome (`completed` or `needs_review`).
pub fn record_job_completed(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::JOBS_COMPLETED_TOTAL, &labels).increment(1);
}

pub fn record_job_failed(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::JOBS_FAILED_TOTAL, &labels).increment(1);
}

/// Record the duration of a pipeline step (`script` or `media`).
pub fn record_step_duration(step: &str, duration_secs: f64) {
    let labels = [("step", step.to_string())];
    histogram!(names::STEP_DURATION_SECONDS, &labels).record(duration_secs);
}
