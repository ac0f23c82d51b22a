//! Script package returned by the script + metadata step.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// End screen configuration suggested for the short.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EndScreenConfig {
    /// Show the subscribe element
    pub subscribe: bool,
    /// Number of recommended videos to show
    pub recommended_videos: u32,
    /// Optional playlist to link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_link: Option<String>,
}

impl Default for EndScreenConfig {
    fn default() -> Self {
        Self {
            subscribe: true,
            recommended_videos: 1,
            playlist_link: None,
        }
    }
}

/// A citation the provider used to ground keyword research.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum GroundingSource {
    /// Web search result
    Web {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
    },
    /// Maps result
    Maps {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
    },
    /// Any other chunk type the provider returned
    Unknown {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
    },
}

impl GroundingSource {
    pub fn web(title: Option<String>, uri: Option<String>) -> Self {
        Self::Web { title, uri }
    }

    pub fn maps(title: Option<String>, uri: Option<String>) -> Self {
        Self::Maps { title, uri }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GroundingSource::Web { .. } => "web",
            GroundingSource::Maps { .. } => "maps",
            GroundingSource::Unknown { .. } => "unknown",
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            GroundingSource::Web { title, .. }
            | GroundingSource::Maps { title, .. }
            | GroundingSource::Unknown { title, .. } => title.as_deref(),
        }
    }

    pub fn uri(&self) -> Option<&str> {
        match self {
            GroundingSource::Web { uri, .. }
            | GroundingSource::Maps { uri, .. }
            | GroundingSource::Unknown { uri, .. } => uri.as_deref(),
        }
    }

    /// Text to show for the citation: the title, else the URI.
    pub fn display_label(&self) -> &str {
        self.title().or_else(|| self.uri()).unwrap_or("Untitled source")
    }
}

/// Output of the script + metadata step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScriptPackage {
    /// Conversational voice-over script (30-60 seconds)
    pub script: String,
    /// SEO title
    pub title: String,
    /// Description with keywords and hashtags
    pub description: String,
    /// Tags, order preserved for display
    pub tags: Vec<String>,
    /// Hashtags
    pub hashtags: Vec<String>,
    /// Text for the pinned comment
    pub pinned_comment: String,
    /// SEO keywords found through search
    pub seo_keywords: Vec<String>,
    /// End screen configuration
    pub end_screen: EndScreenConfig,
    /// Self-reported confidence in [0.0, 1.0]
    pub confidence: f64,
    /// Citations captured from the grounding metadata (may be empty)
    #[serde(default)]
    pub grounding_sources: Vec<GroundingSource>,
}

impl ScriptPackage {
    /// Check that the confidence is a finite value inside [0, 1].
    pub fn has_valid_confidence(&self) -> bool {
        self.confidence.is_finite() && (0.0..=1.0).contains(&self.confidence)
    }
}
