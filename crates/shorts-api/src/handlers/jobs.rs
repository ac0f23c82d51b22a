//! Job handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use shorts_models::{Job, JobPhase};
use shorts_studio::GenerationRequest;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const MAX_TOPIC_LENGTH: usize = 200;
const MAX_UPLOAD_TIME_LENGTH: usize = 64;

/// Start job request. Both fields are optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartJobRequest {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub upload_time: Option<String>,
}

impl StartJobRequest {
    fn validate(&self) -> ApiResult<()> {
        if self.topic.as_deref().is_some_and(|t| t.chars().count() > MAX_TOPIC_LENGTH) {
            return Err(ApiError::bad_request(format!(
                "Topic must be at most {} characters",
                MAX_TOPIC_LENGTH
            )));
        }
        if self
            .upload_time
            .as_deref()
            .is_some_and(|t| t.chars().count() > MAX_UPLOAD_TIME_LENGTH)
        {
            return Err(ApiError::bad_request("Upload time is too long"));
        }
        Ok(())
    }
}

/// Job snapshot plus derived fields for the front-end.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    #[serde(flatten)]
    pub job: Job,
    /// Whether a job can be started without selecting a key first
    pub credential_valid: bool,
    /// URL of the downloaded video under /media
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Manual review notice for low-confidence results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_notice: Option<String>,
}

impl JobResponse {
    pub fn new(job: Job, credential_valid: bool) -> Self {
        let video_url = job
            .result
            .as_ref()
            .and_then(|r| r.video.file_name())
            .map(|name| format!("/media/{}", name));
        let review_notice = match (&job.phase, &job.result) {
            (JobPhase::NeedsReview, Some(result)) => Some(result.review_notice()),
            _ => None,
        };

        Self {
            job,
            credential_valid,
            video_url,
            review_notice,
        }
    }
}

/// Current job state.
pub async fn get_job(State(state): State<AppState>) -> Json<JobResponse> {
    let job = state.orchestrator.snapshot().await;
    Json(JobResponse::new(job, state.credential.is_known_valid()))
}

/// Admit a new job and run it in the background.
pub async fn start_job(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<JobResponse>)> {
    let request: StartJobRequest = if body.is_empty() {
        StartJobRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid job request: {}", e)))?
    };
    request.validate()?;

    let admission = state
        .orchestrator
        .start(GenerationRequest {
            topic: request.topic,
            scheduled_upload_time: request.upload_time,
        })
        .await?;

    info!(
        job_id = %admission.job_id(),
        topic = %admission.topic(),
        "Job accepted"
    );

    let orchestrator = Arc::clone(&state.orchestrator);
    let run = tokio::spawn(async move { orchestrator.execute(admission).await });
    tokio::spawn(async move {
        match run.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!("Generation job ended with error: {}", e),
            // The admission guard has already failed the job.
            Err(e) => error!("Generation task aborted: {}", e),
        }
    });

    let job = state.orchestrator.snapshot().await;
    Ok((
        StatusCode::ACCEPTED,
        Json(JobResponse::new(job, state.credential.is_known_valid())),
    ))
}

/// Return a finished job to Idle.
pub async fn reset_job(State(state): State<AppState>) -> ApiResult<Json<JobResponse>> {
    let job = state.orchestrator.reset().await?;
    Ok(Json(JobResponse::new(job, state.credential.is_known_valid())))
}
