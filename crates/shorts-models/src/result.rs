//! Assembled generation result.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{EndScreenConfig, GroundingSource, JobId, MediaHandle, ScriptPackage, Thumbnail};

/// Publishing metadata copied from the script package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub hashtags: Vec<String>,
    pub pinned_comment: String,
    pub seo_keywords: Vec<String>,
    pub end_screen: EndScreenConfig,
}

impl From<&ScriptPackage> for VideoMetadata {
    fn from(script: &ScriptPackage) -> Self {
        Self {
            title: script.title.clone(),
            description: script.description.clone(),
            tags: script.tags.clone(),
            hashtags: script.hashtags.clone(),
            pinned_comment: script.pinned_comment.clone(),
            seo_keywords: script.seo_keywords.clone(),
            end_screen: script.end_screen.clone(),
        }
    }
}

/// Job report shown next to the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Identifier generated for this job
    pub job_id: JobId,
    /// Caller-supplied upload time, passed through unmodified
    pub scheduled_upload_time: String,
    /// Confidence copied from the script package
    pub confidence: f64,
    /// One-line summary
    pub summary: String,
    /// Citations used for keyword research
    pub grounding_sources: Vec<GroundingSource>,
}

impl Report {
    /// Confidence as a whole percentage for display.
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence * 100.0).round().clamp(0.0, 100.0) as u32
    }
}

/// Final output of a successful job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub video: MediaHandle,
    pub voiceover: MediaHandle,
    pub thumbnails: Vec<Thumbnail>,
    pub metadata: VideoMetadata,
    pub report: Report,
}

impl GenerationResult {
    /// Notice shown when the result was routed to manual review.
    pub fn review_notice(&self) -> String {
        format!(
            "Confidence score is {}%. Please review script and visual coherence before publishing.",
            self.report.confidence_percent()
        )
    }
}

/// Summary line embedding the topic and the number of keywords found.
pub fn summary_line(topic: &str, keyword_count: usize) -> String {
    format!(
        "Generated high-quality human-first short for \"{}\". Script analysis complete with {} keywords found via Search.",
        topic, keyword_count
    )
}
