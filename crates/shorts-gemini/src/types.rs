//! Gemini REST wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use shorts_models::{EndScreenConfig, GroundingSource, ScriptPackage};

use crate::error::{ErrorBody, GatewayError, GatewayResult};

// ============================================================================
// generateContent
// ============================================================================

/// `models/*:generateContent` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Single-turn text request.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![Part::text(prompt)],
            }],
            tools: Vec::new(),
            generation_config: None,
        }
    }

    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search: Option<Value>,
}

impl Tool {
    pub fn google_search() -> Self {
        Self {
            google_search: Some(Value::Object(Default::default())),
        }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

impl SpeechConfig {
    pub fn prebuilt(voice_name: impl Into<String>) -> Self {
        Self {
            voice_config: VoiceConfig {
                prebuilt_voice_config: PrebuiltVoiceConfig {
                    voice_name: voice_name.into(),
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
    pub image_size: String,
}

/// `models/*:generateContent` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<ChunkRef>,
    #[serde(default)]
    pub maps: Option<ChunkRef>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkRef {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

impl From<GroundingChunk> for GroundingSource {
    fn from(chunk: GroundingChunk) -> Self {
        match (chunk.web, chunk.maps) {
            (Some(web), _) => GroundingSource::Web {
                title: web.title,
                uri: web.uri,
            },
            (None, Some(maps)) => GroundingSource::Maps {
                title: maps.title,
                uri: maps.uri,
            },
            (None, None) => GroundingSource::Unknown {
                title: None,
                uri: None,
            },
        }
    }
}

impl GenerateContentResponse {
    fn first_candidate(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.first_candidate()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter())
            .into_iter()
            .flatten()
    }

    /// Concatenated text of the first candidate.
    pub fn text(&self) -> Option<String> {
        let text: String = self.parts().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }

    /// First non-empty inline payload of the first candidate.
    pub fn first_inline_data(&self) -> Option<&InlineData> {
        self.inline_data().next()
    }

    /// Every non-empty inline payload of the first candidate.
    pub fn inline_data(&self) -> impl Iterator<Item = &InlineData> {
        self.parts()
            .filter_map(|p| p.inline_data.as_ref())
            .filter(|d| !d.data.is_empty())
    }

    /// Grounding citations of the first candidate, in provider order.
    pub fn take_grounding_sources(&mut self) -> Vec<GroundingSource> {
        self.candidates
            .first_mut()
            .and_then(|c| c.grounding_metadata.take())
            .map(|m| m.grounding_chunks.into_iter().map(GroundingSource::from).collect())
            .unwrap_or_default()
    }
}

// ============================================================================
// Script payload
// ============================================================================

/// Structured script JSON produced under the response schema.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptPayload {
    pub script: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub hashtags: Vec<String>,
    pub pinned_comment: String,
    pub seo_keywords: Vec<String>,
    pub confidence: f64,
    pub end_screen_config: EndScreenPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndScreenPayload {
    pub subscribe: bool,
    /// Declared as NUMBER in the schema, so it may arrive as a float
    pub recommended_videos: f64,
    #[serde(default)]
    pub playlist_link: Option<String>,
}

impl ScriptPayload {
    /// Parse model text, tolerating a markdown code fence around the JSON.
    pub fn from_model_text(text: &str) -> GatewayResult<Self> {
        let text = strip_code_fence(text);
        serde_json::from_str(text)
            .map_err(|e| GatewayError::parse(format!("Failed to parse script JSON: {}", e)))
    }

    pub fn into_package(self, grounding_sources: Vec<GroundingSource>) -> GatewayResult<ScriptPackage> {
        let package = ScriptPackage {
            script: self.script,
            title: self.title,
            description: self.description,
            tags: self.tags,
            hashtags: self.hashtags,
            pinned_comment: self.pinned_comment,
            seo_keywords: self.seo_keywords,
            end_screen: EndScreenConfig {
                subscribe: self.end_screen_config.subscribe,
                recommended_videos: self.end_screen_config.recommended_videos.max(0.0).round() as u32,
                playlist_link: self.end_screen_config.playlist_link,
            },
            confidence: self.confidence,
            grounding_sources,
        };

        if !package.has_valid_confidence() {
            return Err(GatewayError::parse(format!(
                "Confidence {} is outside [0, 1]",
                package.confidence
            )));
        }
        Ok(package)
    }
}

fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

// ============================================================================
// Long-running video operations
// ============================================================================

/// `models/*:predictLongRunning` request.
#[derive(Debug, Serialize)]
pub struct PredictLongRunningRequest {
    pub instances: Vec<VideoInstance>,
    pub parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
pub struct VideoInstance {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoParameters {
    pub aspect_ratio: String,
    pub resolution: String,
    pub sample_count: u32,
}

impl Default for VideoParameters {
    fn default() -> Self {
        Self {
            aspect_ratio: "9:16".to_string(),
            resolution: "720p".to_string(),
            sample_count: 1,
        }
    }
}

/// Long-running operation status.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<ErrorBody>,
    #[serde(default)]
    pub response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default)]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedSample {
    #[serde(default)]
    pub video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
pub struct VideoRef {
    #[serde(default)]
    pub uri: Option<String>,
}

impl Operation {
    /// Delivery URI of the first generated video.
    pub fn video_uri(&self) -> Option<&str> {
        self.response
            .as_ref()?
            .generate_video_response
            .as_ref()?
            .generated_samples
            .iter()
            .find_map(|s| s.video.as_ref()?.uri.as_deref())
    }
}
