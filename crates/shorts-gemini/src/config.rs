//! Gemini gateway configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::poll::PollPolicy;

/// Default REST endpoint of the Gemini API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini gateway configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key (None until a credential is selected)
    pub api_key: Option<String>,
    /// REST base URL
    pub base_url: String,
    /// Model used for script + metadata generation
    pub script_model: String,
    /// Model used for thumbnail images
    pub image_model: String,
    /// Model used for long-running video generation
    pub video_model: String,
    /// Model used for text-to-speech
    pub tts_model: String,
    /// Prebuilt voice for the voice-over
    pub tts_voice: String,
    /// Video operation polling policy
    pub poll: PollPolicy,
    /// Directory where downloaded videos are written
    pub media_dir: PathBuf,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            script_model: "gemini-3-pro-preview".to_string(),
            image_model: "gemini-3-pro-image-preview".to_string(),
            video_model: "veo-3.1-fast-generate-preview".to_string(),
            tts_model: "gemini-2.5-flash-preview-tts".to_string(),
            tts_voice: "Kore".to_string(),
            poll: PollPolicy::default(),
            media_dir: PathBuf::from("/tmp/shorts-studio/media"),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl GeminiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: api_key_from(|name| std::env::var(name).ok()),
            base_url: std::env::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            script_model: std::env::var("GEMINI_SCRIPT_MODEL").unwrap_or(defaults.script_model),
            image_model: std::env::var("GEMINI_IMAGE_MODEL").unwrap_or(defaults.image_model),
            video_model: std::env::var("GEMINI_VIDEO_MODEL").unwrap_or(defaults.video_model),
            tts_model: std::env::var("GEMINI_TTS_MODEL").unwrap_or(defaults.tts_model),
            tts_voice: std::env::var("GEMINI_TTS_VOICE").unwrap_or(defaults.tts_voice),
            poll: PollPolicy {
                interval: Duration::from_secs(
                    std::env::var("VIDEO_POLL_INTERVAL_SECS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(10),
                ),
                max_attempts: std::env::var("VIDEO_MAX_POLL_ATTEMPTS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            },
            media_dir: std::env::var("MEDIA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.media_dir),
            request_timeout: Duration::from_secs(
                std::env::var("GEMINI_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
        }
    }

    /// Endpoint for a model method, e.g. `generateContent`.
    pub fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url.trim_end_matches('/'), model, method)
    }

    /// Endpoint for a long-running operation name.
    pub fn operation_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), name.trim_start_matches('/'))
    }
}

/// First non-blank key among `GEMINI_API_KEY` and `API_KEY`.
fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    ["GEMINI_API_KEY", "API_KEY"]
        .into_iter()
        .filter_map(|name| lookup(name))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}
