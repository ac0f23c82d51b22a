//! Tests for the generation orchestrator.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::Instant;

use shorts_gemini::{GatewayError, GatewayResult, ProviderGateway};
use shorts_models::error::{CREDENTIAL_MESSAGE, PARSE_MESSAGE, PROVIDER_MESSAGE};
use shorts_models::{
    EndScreenConfig, FailureKind, GroundingSource, JobEvent, JobPhase, MediaHandle, ScriptPackage,
    Thumbnail, ThumbnailVariant,
};

use crate::config::StudioConfig;
use crate::credential::CredentialState;
use crate::error::StudioError;
use crate::orchestrator::{GenerationRequest, Orchestrator, INTERRUPTED_MESSAGE};

// =============================================================================
// Test Helpers
// =============================================================================

type FailureFn = fn() -> GatewayError;

/// In-memory gateway with scripted outcomes.
struct ScriptedGateway {
    confidence: f64,
    keywords: usize,
    /// Per-call latency (advanced instantly under paused time)
    delay: Duration,
    /// Drop the last thumbnail to simulate a shortfall
    short_thumbnails: bool,
    failures: HashMap<&'static str, FailureFn>,
    /// Step that panics instead of answering
    panics_in: Option<&'static str>,
    topics: StdMutex<Vec<String>>,
    /// (step, started, finished)
    calls: StdMutex<Vec<(&'static str, Instant, Instant)>>,
}

impl ScriptedGateway {
    fn new(confidence: f64) -> Self {
        Self {
            confidence,
            keywords: 3,
            delay: Duration::ZERO,
            short_thumbnails: false,
            failures: HashMap::new(),
            panics_in: None,
            topics: StdMutex::new(Vec::new()),
            calls: StdMutex::new(Vec::new()),
        }
    }

    fn failing(mut self, step: &'static str, failure: FailureFn) -> Self {
        self.failures.insert(step, failure);
        self
    }

    fn panicking(mut self, step: &'static str) -> Self {
        self.panics_in = Some(step);
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn step(&self, name: &'static str) -> GatewayResult<()> {
        let started = Instant::now();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.panics_in == Some(name) {
            panic!("{} step crashed", name);
        }
        self.calls
            .lock()
            .unwrap()
            .push((name, started, Instant::now()));

        match self.failures.get(name) {
            Some(failure) => Err(failure()),
            None => Ok(()),
        }
    }

    fn called(&self, name: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|(n, _, _)| *n == name)
    }

    fn topics(&self) -> Vec<String> {
        self.topics.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderGateway for ScriptedGateway {
    async fn generate_script(&self, topic: &str) -> GatewayResult<ScriptPackage> {
        self.topics.lock().unwrap().push(topic.to_string());
        self.step("script").await?;

        Ok(ScriptPackage {
            script: "Hey friends, three quick wins for today.".to_string(),
            title: format!("{} in 60 seconds", topic),
            description: "Short and useful #shorts".to_string(),
            tags: vec!["tips".to_string(); 8],
            hashtags: vec!["#shorts".to_string()],
            pinned_comment: "Which one will you try?".to_string(),
            seo_keywords: (0..self.keywords).map(|i| format!("keyword {}", i)).collect(),
            end_screen: EndScreenConfig {
                subscribe: true,
                recommended_videos: 2,
                playlist_link: None,
            },
            confidence: self.confidence,
            grounding_sources: vec![GroundingSource::web(
                Some("Example".to_string()),
                Some("https://example.com".to_string()),
            )],
        })
    }

    async fn generate_thumbnails(
        &self,
        _title: &str,
        variants: &[ThumbnailVariant],
    ) -> GatewayResult<Vec<Thumbnail>> {
        self.step("thumbnails").await?;

        let count = if self.short_thumbnails {
            variants.len().saturating_sub(1)
        } else {
            variants.len()
        };
        Ok(variants
            .iter()
            .take(count)
            .map(|v| Thumbnail {
                variant: v.label.clone(),
                image: MediaHandle::data_uri("image/png", "iVBORw0KGgo="),
            })
            .collect())
    }

    async fn generate_video(&self, _script: &str) -> GatewayResult<MediaHandle> {
        self.step("video").await?;
        Ok(MediaHandle::file("video/mp4", "/tmp/shorts/video.mp4"))
    }

    async fn generate_voiceover(&self, _script: &str) -> GatewayResult<MediaHandle> {
        self.step("voiceover").await?;
        Ok(MediaHandle::data_uri("audio/wav", "UklGRg=="))
    }
}

fn orchestrator(gateway: Arc<ScriptedGateway>) -> Orchestrator {
    Orchestrator::new(gateway, StudioConfig::default(), CredentialState::new(true))
        .with_rng(StdRng::seed_from_u64(7))
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<JobEvent>) -> Vec<JobEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// =============================================================================
// Confidence Gate
// =============================================================================

#[tokio::test]
async fn test_confidence_at_threshold_completes() {
    let gateway = Arc::new(ScriptedGateway::new(0.8));
    let studio = orchestrator(gateway);

    let result = studio.run(GenerationRequest::new("Quick Tips")).await.unwrap();
    let job = studio.snapshot().await;

    assert_eq!(job.phase, JobPhase::Completed);
    assert_eq!(job.progress, 100);
    assert_eq!(result.report.confidence, 0.8);
    assert_eq!(job.result.as_ref(), Some(&result));
    assert!(job.error.is_none());
}

#[tokio::test]
async fn test_confidence_below_threshold_needs_review() {
    let gateway = Arc::new(ScriptedGateway::new(0.79));
    let studio = orchestrator(gateway);

    let result = studio.run(GenerationRequest::new("Quick Tips")).await.unwrap();
    let job = studio.snapshot().await;

    assert_eq!(job.phase, JobPhase::NeedsReview);
    assert_eq!(job.progress, 100);
    assert_eq!(result.report.confidence, 0.79);
    assert!(job.result.is_some());
}

// =============================================================================
// Assembly
// =============================================================================

#[tokio::test]
async fn test_result_assembly() {
    let gateway = Arc::new(ScriptedGateway::new(0.91));
    let studio = orchestrator(gateway);

    let result = studio
        .run(GenerationRequest::new("Sleep Hacks").with_upload_time("18:30"))
        .await
        .unwrap();

    assert!(result.report.job_id.as_str().starts_with("SH-AI-"));
    assert_eq!(result.report.scheduled_upload_time, "18:30");
    assert_eq!(
        result.report.summary,
        "Generated high-quality human-first short for \"Sleep Hacks\". Script analysis complete with 3 keywords found via Search."
    );
    assert_eq!(result.report.grounding_sources.len(), 1);
    assert_eq!(result.metadata.title, "Sleep Hacks in 60 seconds");
    assert_eq!(result.thumbnails.len(), 2);
    assert_eq!(result.thumbnails[0].variant, "A");
    assert_eq!(result.thumbnails[1].variant, "B");
    assert_eq!(result.video.mime_type(), "video/mp4");
    assert_eq!(result.voiceover.mime_type(), "audio/wav");
}

#[tokio::test]
async fn test_default_upload_time() {
    let studio = orchestrator(Arc::new(ScriptedGateway::new(0.9)));
    let result = studio.run(GenerationRequest::new("Quick Tips")).await.unwrap();
    assert_eq!(result.report.scheduled_upload_time, "09:00");
}

#[tokio::test]
async fn test_each_run_gets_fresh_job_id() {
    let studio = orchestrator(Arc::new(ScriptedGateway::new(0.9)));

    let first = studio.run(GenerationRequest::new("Quick Tips")).await.unwrap();
    let second = studio.run(GenerationRequest::new("Quick Tips")).await.unwrap();
    assert_ne!(first.report.job_id, second.report.job_id);
}

// =============================================================================
// Topic Selection
// =============================================================================

#[tokio::test]
async fn test_blank_topic_draws_from_catalog() {
    let gateway = Arc::new(ScriptedGateway::new(0.9));
    let studio = orchestrator(gateway.clone());
    let catalog = studio.config().themes.clone();

    for i in 0..100 {
        let topic = if i % 2 == 0 { None } else { Some("   ".to_string()) };
        let request = GenerationRequest {
            topic,
            scheduled_upload_time: None,
        };
        studio.run(request).await.unwrap();
    }

    let topics = gateway.topics();
    assert_eq!(topics.len(), 100);
    assert!(topics.iter().all(|t| catalog.contains(t)));
}

#[tokio::test]
async fn test_blank_topic_covers_every_theme() {
    let gateway = Arc::new(ScriptedGateway::new(0.9));
    let studio = orchestrator(gateway.clone());

    for _ in 0..500 {
        studio.run(GenerationRequest::default()).await.unwrap();
    }

    let seen: HashSet<String> = gateway.topics().into_iter().collect();
    assert_eq!(seen.len(), studio.config().themes.len());
}

#[tokio::test]
async fn test_explicit_topic_is_used() {
    let gateway = Arc::new(ScriptedGateway::new(0.9));
    let studio = orchestrator(gateway.clone());

    studio.run(GenerationRequest::new("Cast Iron Care")).await.unwrap();
    assert_eq!(gateway.topics(), vec!["Cast Iron Care".to_string()]);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_media_steps_overlap() {
    let gateway = Arc::new(ScriptedGateway::new(0.9).with_delay(Duration::from_secs(30)));
    let studio = orchestrator(gateway.clone());

    let started = Instant::now();
    studio.run(GenerationRequest::new("Quick Tips")).await.unwrap();

    // Script (30s) then the three media calls together (30s)
    assert!(started.elapsed() < Duration::from_secs(90));

    let calls = gateway.calls.lock().unwrap().clone();
    let media: Vec<_> = calls.iter().filter(|(n, _, _)| *n != "script").collect();
    assert_eq!(media.len(), 3);

    let latest_start = media.iter().map(|(_, s, _)| *s).max().unwrap();
    let earliest_end = media.iter().map(|(_, _, e)| *e).min().unwrap();
    assert!(latest_start < earliest_end);

    let script_end = calls.iter().find(|(n, _, _)| *n == "script").unwrap().2;
    assert!(media.iter().all(|(_, s, _)| *s >= script_end));
}

#[tokio::test]
async fn test_run_while_in_flight_is_rejected() {
    let studio = orchestrator(Arc::new(ScriptedGateway::new(0.9)));

    let admission = studio.start(GenerationRequest::new("First")).await.unwrap();
    let before = studio.snapshot().await;

    let err = studio.start(GenerationRequest::new("Second")).await.unwrap_err();
    assert!(matches!(err, StudioError::Busy(JobPhase::Scripting)));
    assert_eq!(studio.snapshot().await, before);

    studio.execute(admission).await.unwrap();
    let job = studio.snapshot().await;
    assert_eq!(job.topic.as_deref(), Some("First"));
    assert_eq!(job.phase, JobPhase::Completed);
}

#[tokio::test]
async fn test_reset_while_in_flight_is_rejected() {
    let studio = orchestrator(Arc::new(ScriptedGateway::new(0.9)));

    let _admission = studio.start(GenerationRequest::new("First")).await.unwrap();
    assert!(matches!(
        studio.reset().await,
        Err(StudioError::Busy(JobPhase::Scripting))
    ));
}

// =============================================================================
// Interrupted Runs
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_dropped_run_fails_job() {
    let gateway = Arc::new(ScriptedGateway::new(0.9).with_delay(Duration::from_secs(30)));
    let studio = orchestrator(gateway);
    let mut rx = studio.subscribe();

    let timed_out = tokio::time::timeout(
        Duration::from_secs(40),
        studio.run(GenerationRequest::new("Quick Tips")),
    )
    .await;
    assert!(timed_out.is_err());

    let job = studio.snapshot().await;
    assert_eq!(job.phase, JobPhase::Failed);
    assert_eq!(job.progress, 25);
    assert!(job.result.is_none());
    let error = job.error.unwrap();
    assert_eq!(error.kind, FailureKind::Provider);
    assert_eq!(error.message, INTERRUPTED_MESSAGE);

    assert!(drain(&mut rx)
        .iter()
        .any(|e| matches!(e, JobEvent::Failed { message, .. } if message == INTERRUPTED_MESSAGE)));

    tokio_test::assert_ok!(studio.reset().await);
    let admission = tokio_test::assert_ok!(studio.start(GenerationRequest::new("Again")).await);
    assert_eq!(admission.topic(), "Again");
}

#[tokio::test]
async fn test_dropped_admission_fails_job() {
    let studio = orchestrator(Arc::new(ScriptedGateway::new(0.9)));

    let admission = studio.start(GenerationRequest::new("First")).await.unwrap();
    drop(admission);

    let job = studio.snapshot().await;
    assert_eq!(job.phase, JobPhase::Failed);
    assert_eq!(job.progress, 5);

    let result = studio.run(GenerationRequest::new("Second")).await.unwrap();
    assert_eq!(result.metadata.title, "Second in 60 seconds");
    assert_eq!(studio.snapshot().await.phase, JobPhase::Completed);
}

#[tokio::test]
async fn test_panicking_gateway_fails_job() {
    let gateway = Arc::new(ScriptedGateway::new(0.9).panicking("video"));
    let studio = Arc::new(orchestrator(gateway));

    let admission = studio.start(GenerationRequest::new("Quick Tips")).await.unwrap();
    let runner = Arc::clone(&studio);
    let handle = tokio::spawn(async move { runner.execute(admission).await });

    let join_error = handle.await.unwrap_err();
    assert!(join_error.is_panic());

    let job = studio.snapshot().await;
    assert_eq!(job.phase, JobPhase::Failed);
    assert_eq!(job.error.unwrap().message, INTERRUPTED_MESSAGE);
    tokio_test::assert_ok!(studio.reset().await);
}

#[tokio::test]
async fn test_finished_run_is_not_marked_interrupted() {
    let studio = orchestrator(Arc::new(ScriptedGateway::new(0.9)));

    studio.run(GenerationRequest::new("Quick Tips")).await.unwrap();
    let job = studio.snapshot().await;
    assert_eq!(job.phase, JobPhase::Completed);
    assert!(job.error.is_none());
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_video_failure_fails_job_without_result() {
    let gateway = Arc::new(ScriptedGateway::new(0.9).failing("video", || {
        GatewayError::from_http_status(429, r#"{"error":{"message":"Quota exceeded for veo"}}"#)
    }));
    let studio = orchestrator(gateway);

    let err = studio.run(GenerationRequest::new("Quick Tips")).await.unwrap_err();
    let failure = err.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::Provider);
    assert_eq!(failure.message, "Quota exceeded for veo");

    let job = studio.snapshot().await;
    assert_eq!(job.phase, JobPhase::Failed);
    assert_eq!(job.progress, 25);
    assert!(job.result.is_none());
    assert_eq!(job.error.as_ref(), Some(failure));
}

#[tokio::test]
async fn test_any_media_failure_discards_partial_results() {
    for step in ["thumbnails", "video", "voiceover"] {
        let gateway = Arc::new(
            ScriptedGateway::new(0.9).failing(step, || GatewayError::config("boom")),
        );
        let studio = orchestrator(gateway);

        let err = studio.run(GenerationRequest::new("Quick Tips")).await.unwrap_err();
        assert_eq!(err.failure().unwrap().message, PROVIDER_MESSAGE, "step {}", step);

        let job = studio.snapshot().await;
        assert_eq!(job.phase, JobPhase::Failed, "step {}", step);
        assert!(job.result.is_none(), "step {}", step);
    }
}

#[tokio::test]
async fn test_voiceover_empty_response_is_provider_failure() {
    let gateway = Arc::new(
        ScriptedGateway::new(0.9).failing("voiceover", || GatewayError::empty_response("Voiceover failed")),
    );
    let studio = orchestrator(gateway);

    let err = studio.run(GenerationRequest::new("Quick Tips")).await.unwrap_err();
    let failure = err.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::Provider);
    assert_eq!(failure.message, "Voiceover failed");
}

#[tokio::test]
async fn test_thumbnail_shortfall_fails_job() {
    let mut gateway = ScriptedGateway::new(0.9);
    gateway.short_thumbnails = true;
    let studio = orchestrator(Arc::new(gateway));

    let err = studio.run(GenerationRequest::new("Quick Tips")).await.unwrap_err();
    assert_eq!(err.failure().unwrap().kind, FailureKind::Provider);
    assert_eq!(studio.snapshot().await.phase, JobPhase::Failed);
}

#[tokio::test]
async fn test_script_parse_failure_skips_media() {
    let gateway = Arc::new(
        ScriptedGateway::new(0.9).failing("script", || GatewayError::parse("bad json")),
    );
    let studio = orchestrator(gateway.clone());

    let err = studio.run(GenerationRequest::new("Quick Tips")).await.unwrap_err();
    let failure = err.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::Parse);
    assert_eq!(failure.message, PARSE_MESSAGE);

    let job = studio.snapshot().await;
    assert_eq!(job.phase, JobPhase::Failed);
    assert_eq!(job.progress, 5);
    assert!(!gateway.called("video"));
    assert!(!gateway.called("thumbnails"));
    assert!(!gateway.called("voiceover"));
}

#[tokio::test]
async fn test_credential_failure_clears_credential() {
    let gateway = Arc::new(ScriptedGateway::new(0.9).failing("video", || {
        GatewayError::credential("Requested entity was not found.")
    }));
    let studio = orchestrator(gateway.clone());

    let err = studio.run(GenerationRequest::new("Quick Tips")).await.unwrap_err();
    let failure = err.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::Credential);
    assert_eq!(failure.message, CREDENTIAL_MESSAGE);
    assert!(!studio.credential().is_known_valid());

    // Next attempt is refused before the job or provider is touched
    let calls_before = gateway.calls.lock().unwrap().len();
    let failed = studio.snapshot().await;
    let err = studio.run(GenerationRequest::new("Quick Tips")).await.unwrap_err();
    assert!(matches!(err, StudioError::CredentialRequired));
    assert_eq!(studio.snapshot().await, failed);
    assert_eq!(gateway.calls.lock().unwrap().len(), calls_before);

    // Selecting a credential again allows a new run
    studio.credential().mark_valid();
    let err = studio.run(GenerationRequest::new("Quick Tips")).await.unwrap_err();
    assert_eq!(err.failure().unwrap().kind, FailureKind::Credential);
}

#[tokio::test]
async fn test_missing_credential_is_refused() {
    let gateway = Arc::new(ScriptedGateway::new(0.9));
    let studio = Orchestrator::new(gateway.clone(), StudioConfig::default(), CredentialState::new(false));

    let err = studio.run(GenerationRequest::new("Quick Tips")).await.unwrap_err();
    assert!(matches!(err, StudioError::CredentialRequired));
    assert_eq!(studio.snapshot().await.phase, JobPhase::Idle);
    assert!(gateway.topics().is_empty());
}

// =============================================================================
// Reset
// =============================================================================

#[tokio::test]
async fn test_reset_clears_terminal_job() {
    let studio = orchestrator(Arc::new(ScriptedGateway::new(0.9)));
    studio.run(GenerationRequest::new("Quick Tips")).await.unwrap();

    let job = studio.reset().await.unwrap();
    assert_eq!(job.phase, JobPhase::Idle);
    assert_eq!(job.progress, 0);
    assert!(job.result.is_none());
    assert!(job.error.is_none());
    assert_eq!(studio.snapshot().await, job);
}

#[tokio::test]
async fn test_reset_after_failure() {
    let gateway = Arc::new(
        ScriptedGateway::new(0.9).failing("script", || GatewayError::parse("bad json")),
    );
    let studio = orchestrator(gateway);
    let _ = studio.run(GenerationRequest::new("Quick Tips")).await;

    let job = studio.reset().await.unwrap();
    assert_eq!(job.phase, JobPhase::Idle);
    assert!(job.error.is_none());
}

// =============================================================================
// Events
// =============================================================================

#[tokio::test]
async fn test_events_follow_phase_order() {
    let studio = orchestrator(Arc::new(ScriptedGateway::new(0.85)));
    let mut rx = studio.subscribe();

    studio.run(GenerationRequest::new("Quick Tips")).await.unwrap();
    let events = drain(&mut rx);

    assert!(matches!(events.first(), Some(JobEvent::Snapshot { .. })));

    let phases: Vec<(JobPhase, u8)> = events
        .iter()
        .filter_map(|e| match e {
            JobEvent::Phase { phase, progress } => Some((*phase, *progress)),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            (JobPhase::Scripting, 5),
            (JobPhase::MediaSynthesis, 25),
            (JobPhase::Assembling, 85),
            (JobPhase::Completed, 100),
        ]
    );

    assert!(matches!(
        events.last(),
        Some(JobEvent::Done { phase: JobPhase::Completed, .. })
    ));
}

#[tokio::test]
async fn test_failure_event_carries_message() {
    let gateway = Arc::new(
        ScriptedGateway::new(0.9).failing("script", || GatewayError::parse("bad json")),
    );
    let studio = orchestrator(gateway);
    let mut rx = studio.subscribe();

    let _ = studio.run(GenerationRequest::new("Quick Tips")).await;
    let events = drain(&mut rx);

    let failed = events
        .iter()
        .find_map(|e| match e {
            JobEvent::Failed { kind, message, .. } => Some((*kind, message.clone())),
            _ => None,
        })
        .unwrap();
    assert_eq!(failed, (FailureKind::Parse, PARSE_MESSAGE.to_string()));
}

#[tokio::test]
async fn test_reset_emits_event() {
    let studio = orchestrator(Arc::new(ScriptedGateway::new(0.9)));
    studio.run(GenerationRequest::new("Quick Tips")).await.unwrap();

    let mut rx = studio.subscribe();
    tokio_test::assert_ok!(studio.reset().await);
    assert!(matches!(drain(&mut rx).as_slice(), [JobEvent::Reset]));
}
