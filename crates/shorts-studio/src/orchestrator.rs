//! Generation orchestrator.
//!
//! Drives one job at a time through script generation, the concurrent media
//! fan-out (thumbnails, video, voice-over), result assembly and the
//! confidence gate. Every phase change is written to the shared job record
//! and broadcast as a [`JobEvent`].

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{warn, Instrument};

use shorts_gemini::{GatewayError, ProviderGateway};
use shorts_models::job::{PROGRESS_ASSEMBLING, PROGRESS_DONE, PROGRESS_MEDIA, PROGRESS_SCRIPTING};
use shorts_models::result::summary_line;
use shorts_models::theme::DEFAULT_THEMES;
use shorts_models::{
    FailureKind, GenerationResult, Job, JobEvent, JobFailure, JobId, JobPhase, MediaBundle,
    Report, ScriptPackage, VideoMetadata,
};

use crate::config::StudioConfig;
use crate::credential::CredentialState;
use crate::error::{StudioError, StudioResult};
use crate::logging::JobLogger;
use crate::metrics;

/// Caller input for a generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// Topic; blank picks a random theme
    pub topic: Option<String>,
    /// Upload time echoed into the report; `None` uses the configured default
    pub scheduled_upload_time: Option<String>,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
            scheduled_upload_time: None,
        }
    }

    pub fn with_upload_time(mut self, time: impl Into<String>) -> Self {
        self.scheduled_upload_time = Some(time.into());
        self
    }
}

/// Failure recorded when a run stops before reaching a terminal phase.
pub const INTERRUPTED_MESSAGE: &str = "Generation was interrupted";

/// An admitted job, ready to execute.
///
/// Only [`Orchestrator::start`] creates one, so holding an `Admission` means
/// the shared job record is in flight for this run. Dropping it before the
/// run finishes (cancelled future, panicking task) fails the job so the
/// orchestrator accepts new work again.
#[derive(Debug)]
pub struct Admission {
    job_id: JobId,
    topic: String,
    scheduled_upload_time: String,
    guard: InterruptGuard,
}

impl Admission {
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Resolved topic (the picked theme when the request was blank).
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn scheduled_upload_time(&self) -> &str {
        &self.scheduled_upload_time
    }
}

/// Fails the admitted job on drop unless the run reached a terminal phase.
#[derive(Debug)]
struct InterruptGuard {
    job: Arc<RwLock<Job>>,
    events: broadcast::Sender<JobEvent>,
    job_id: JobId,
    started_at: Option<DateTime<Utc>>,
    armed: bool,
}

impl InterruptGuard {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        if let Ok(mut job) = self.job.try_write() {
            interrupt(&mut job, self.started_at, &self.events, &self.job_id);
            return;
        }

        // Lock is busy; finish the cleanup on the runtime.
        match Handle::try_current() {
            Ok(handle) => {
                let job = Arc::clone(&self.job);
                let events = self.events.clone();
                let job_id = self.job_id.clone();
                let started_at = self.started_at;
                handle.spawn(async move {
                    let mut job = job.write().await;
                    interrupt(&mut job, started_at, &events, &job_id);
                });
            }
            Err(_) => warn!(
                job_id = %self.job_id,
                "Generation interrupted outside a runtime; job left in flight"
            ),
        }
    }
}

fn interrupt(
    job: &mut Job,
    started_at: Option<DateTime<Utc>>,
    events: &broadcast::Sender<JobEvent>,
    job_id: &JobId,
) {
    // A different job may have been admitted since.
    if !job.is_in_flight() || job.started_at != started_at {
        return;
    }

    let failure = JobFailure::provider(Some(INTERRUPTED_MESSAGE));
    let phase = job.phase;
    if job.fail(failure.clone()).is_ok() {
        warn!(job_id = %job_id, phase = %phase, "Generation interrupted before finishing");
        metrics::record_job_failed(failure.kind.as_str());
        let _ = events.send(JobEvent::failed(failure.kind, failure.message));
    }
}

/// Single-job generation orchestrator.
pub struct Orchestrator {
    gateway: Arc<dyn ProviderGateway>,
    config: StudioConfig,
    credential: CredentialState,
    job: Arc<RwLock<Job>>,
    rng: Mutex<StdRng>,
    events: broadcast::Sender<JobEvent>,
}

impl Orchestrator {
    pub fn new(
        gateway: Arc<dyn ProviderGateway>,
        config: StudioConfig,
        credential: CredentialState,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            gateway,
            config,
            credential,
            job: Arc::new(RwLock::new(Job::new())),
            rng: Mutex::new(StdRng::from_os_rng()),
            events,
        }
    }

    /// Replace the theme picker's RNG (seeded in tests).
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn credential(&self) -> &CredentialState {
        &self.credential
    }

    /// Copy of the current job record.
    pub async fn snapshot(&self) -> Job {
        self.job.read().await.clone()
    }

    /// Receive progress events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    /// Admit and execute a job to completion.
    pub async fn run(&self, request: GenerationRequest) -> StudioResult<GenerationResult> {
        let admission = self.start(request).await?;
        self.execute(admission).await
    }

    /// Admit a new job.
    ///
    /// Fails without touching the job record when no credential is known to
    /// be valid or another job is in flight. Starting over a terminal job
    /// discards its result.
    pub async fn start(&self, request: GenerationRequest) -> StudioResult<Admission> {
        if !self.credential.is_known_valid() {
            metrics::record_job_rejected("credential");
            return Err(StudioError::CredentialRequired);
        }

        let topic = self.resolve_topic(request.topic.as_deref()).await;
        let scheduled_upload_time = request
            .scheduled_upload_time
            .unwrap_or_else(|| self.config.default_upload_time.clone());

        let snapshot = {
            let mut job = self.job.write().await;
            if let Err(e) = job.begin(topic.clone(), scheduled_upload_time.clone()) {
                metrics::record_job_rejected("busy");
                return Err(e.into());
            }
            job.clone()
        };

        let job_id = JobId::new();
        let admission = Admission {
            guard: InterruptGuard {
                job: Arc::clone(&self.job),
                events: self.events.clone(),
                job_id: job_id.clone(),
                started_at: snapshot.started_at,
                armed: true,
            },
            job_id,
            topic,
            scheduled_upload_time,
        };

        JobLogger::new(&admission.job_id, "generate_short")
            .log_start(&format!("topic=\"{}\"", admission.topic));
        metrics::record_job_started();
        self.emit(JobEvent::snapshot(&snapshot));
        self.emit(JobEvent::phase(JobPhase::Scripting, PROGRESS_SCRIPTING));

        Ok(admission)
    }

    /// Execute an admitted job.
    ///
    /// On failure the job is moved to `Failed` with the classified error and
    /// [`StudioError::Failed`] is returned.
    pub async fn execute(&self, mut admission: Admission) -> StudioResult<GenerationResult> {
        let logger = JobLogger::new(&admission.job_id, "generate_short");

        let outcome = match self
            .pipeline(&admission, &logger)
            .instrument(logger.create_span())
            .await
        {
            Ok(result) => Ok(result),
            Err(error) => {
                let failure = self.record_failure(&error, &logger).await;
                Err(StudioError::Failed(failure))
            }
        };

        admission.guard.disarm();
        outcome
    }

    /// Return the job to Idle. Rejected while a job is in flight.
    pub async fn reset(&self) -> StudioResult<Job> {
        let snapshot = {
            let mut job = self.job.write().await;
            job.reset()?;
            job.clone()
        };
        self.emit(JobEvent::Reset);
        Ok(snapshot)
    }

    async fn pipeline(&self, admission: &Admission, logger: &JobLogger) -> StudioResult<GenerationResult> {
        // Step 1: script + metadata, grounded in search
        logger.log_progress("Generating script and SEO metadata");
        self.emit(JobEvent::log(format!(
            "Analyzing trends and writing a script for \"{}\"...",
            admission.topic
        )));

        let started = Instant::now();
        let script = self.gateway.generate_script(&admission.topic).await?;
        metrics::record_step_duration("script", started.elapsed().as_secs_f64());

        self.emit(JobEvent::log(format!(
            "Script ready: \"{}\" ({} keywords)",
            script.title,
            script.seo_keywords.len()
        )));
        self.advance(JobPhase::MediaSynthesis, PROGRESS_MEDIA).await?;

        // Step 2: media fan-out, fail-fast
        logger.log_progress("Synthesizing thumbnails, video and voice-over");
        self.emit(JobEvent::log("Rendering thumbnails, video and voice-over in parallel..."));

        let variants = &self.config.thumbnail_variants;
        let started = Instant::now();
        let (thumbnails, video, voiceover) = tokio::try_join!(
            self.gateway.generate_thumbnails(&script.title, variants),
            self.gateway.generate_video(&script.script),
            self.gateway.generate_voiceover(&script.script),
        )?;
        metrics::record_step_duration("media", started.elapsed().as_secs_f64());

        if thumbnails.len() != variants.len() {
            return Err(GatewayError::empty_response(format!(
                "Expected {} thumbnails, received {}",
                variants.len(),
                thumbnails.len()
            ))
            .into());
        }
        self.advance(JobPhase::Assembling, PROGRESS_ASSEMBLING).await?;

        // Assemble + gate
        let media = MediaBundle {
            video,
            voiceover,
            thumbnails,
        };
        let result = assemble(admission, &script, media);
        let confidence = result.report.confidence;

        let phase = {
            let mut job = self.job.write().await;
            job.set_progress(PROGRESS_DONE)?;
            job.complete(result.clone(), self.config.confidence_threshold)?
        };

        self.emit(JobEvent::phase(phase, PROGRESS_DONE));
        self.emit(JobEvent::done(admission.job_id.clone(), phase, confidence));
        if phase == JobPhase::NeedsReview {
            self.emit(JobEvent::log(result.review_notice()));
        }

        metrics::record_job_completed(phase.as_str());
        logger.log_completion(&format!("phase={} confidence={:.2}", phase, confidence));

        Ok(result)
    }

    async fn advance(&self, phase: JobPhase, progress: u8) -> StudioResult<()> {
        self.job.write().await.advance(phase, progress)?;
        self.emit(JobEvent::phase(phase, progress));
        Ok(())
    }

    async fn record_failure(&self, error: &StudioError, logger: &JobLogger) -> JobFailure {
        let failure = match error {
            StudioError::Gateway(e) => failure_from(e),
            StudioError::Failed(f) => f.clone(),
            other => JobFailure::provider(Some(&other.to_string())),
        };

        logger.log_error(&error.to_string());
        if failure.kind.requires_credential() {
            self.credential.invalidate();
            logger.log_warning("Credential rejected by the provider; a new key must be selected");
        }

        if let Err(e) = self.job.write().await.fail(failure.clone()) {
            logger.log_warning(&format!("Could not record failure on job: {}", e));
        }

        self.emit(JobEvent::failed(failure.kind, failure.message.clone()));
        metrics::record_job_failed(failure.kind.as_str());
        failure
    }

    async fn resolve_topic(&self, topic: Option<&str>) -> String {
        if let Some(topic) = topic.map(str::trim).filter(|t| !t.is_empty()) {
            return topic.to_string();
        }

        let mut rng = self.rng.lock().await;
        self.config
            .themes
            .as_slice()
            .choose(&mut *rng)
            .cloned()
            .unwrap_or_else(|| DEFAULT_THEMES[0].to_string())
    }

    fn emit(&self, event: JobEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Classify a gateway error into the failure recorded on the job.
pub fn failure_from(error: &GatewayError) -> JobFailure {
    match error.kind() {
        FailureKind::Credential => JobFailure::credential(),
        FailureKind::Parse => JobFailure::parse(),
        FailureKind::EmptyResponse => {
            JobFailure::empty_response(error.detail().unwrap_or_else(|| error.to_string()))
        }
        FailureKind::Provider => JobFailure::provider(error.detail().as_deref()),
    }
}

fn assemble(admission: &Admission, script: &ScriptPackage, media: MediaBundle) -> GenerationResult {
    GenerationResult {
        video: media.video,
        voiceover: media.voiceover,
        thumbnails: media.thumbnails,
        metadata: VideoMetadata::from(script),
        report: Report {
            job_id: admission.job_id.clone(),
            scheduled_upload_time: admission.scheduled_upload_time.clone(),
            confidence: script.confidence,
            summary: summary_line(&admission.topic, script.seo_keywords.len()),
            grounding_sources: script.grounding_sources.clone(),
        },
    }
}
