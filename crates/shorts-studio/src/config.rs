//! Orchestrator configuration.

use shorts_models::{ThemeCatalog, ThumbnailVariant};

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Results below this confidence are routed to manual review
    pub confidence_threshold: f64,
    /// Themes drawn from when the topic is left blank
    pub themes: ThemeCatalog,
    /// Thumbnail variants requested per job
    pub thumbnail_variants: Vec<ThumbnailVariant>,
    /// Upload time used when the caller supplies none
    pub default_upload_time: String,
    /// Capacity of the progress event channel
    pub event_capacity: usize,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.8,
            themes: ThemeCatalog::default(),
            thumbnail_variants: ThumbnailVariant::defaults(),
            default_upload_time: "09:00".to_string(),
            event_capacity: 256,
        }
    }
}

impl StudioConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            confidence_threshold: std::env::var("CONFIDENCE_THRESHOLD")
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|t| (0.0..=1.0).contains(t))
                .unwrap_or(defaults.confidence_threshold),
            themes: std::env::var("STUDIO_THEMES")
                .ok()
                .and_then(|s| ThemeCatalog::new(s.split(',').map(str::to_string)))
                .unwrap_or(defaults.themes),
            thumbnail_variants: defaults.thumbnail_variants,
            default_upload_time: std::env::var("DEFAULT_UPLOAD_TIME")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.default_upload_time),
            event_capacity: std::env::var("STUDIO_EVENT_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|c| *c > 0)
                .unwrap_or(defaults.event_capacity),
        }
    }
}
