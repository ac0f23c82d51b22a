//! Prompt text and response schemas sent to the provider.

use serde_json::{json, Value};

use shorts_models::ThumbnailVariant;

/// Topic used if an empty string ever reaches the gateway.
const FALLBACK_TOPIC: &str = "trending topics";

/// Suffix appended to the script for video generation.
pub const VIDEO_STYLE_SUFFIX: &str = "cinematic vertical 9:16, handheld human-like camera motion, realistic lighting, high detail, no watermarks";

/// Script + metadata request for a topic.
pub fn script_prompt(topic: &str) -> String {
    let topic = if topic.trim().is_empty() {
        FALLBACK_TOPIC
    } else {
        topic.trim()
    };

    format!(
        r#"Perform an SEO analysis and generate a 30-60 second conversational YouTube Shorts script and full metadata for the theme: {topic}.
The script should feel human, natural, and engaging.
Use Google Search to find trending keywords for this theme.
Include:
1. A conversational script.
2. SEO-optimized Title (max 60 chars).
3. Description with keywords and hashtags.
4. 8-12 Tags.
5. Hashtags.
6. A pinned comment text.
7. SEO keywords found through search.
8. End screen config.
9. A self-assessment confidence score (0.0 to 1.0) for the creative quality."#
    )
}

/// JSON schema the script response must follow.
pub fn script_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "script": { "type": "STRING" },
            "title": { "type": "STRING" },
            "description": { "type": "STRING" },
            "tags": { "type": "ARRAY", "items": { "type": "STRING" } },
            "hashtags": { "type": "ARRAY", "items": { "type": "STRING" } },
            "pinnedComment": { "type": "STRING" },
            "seoKeywords": { "type": "ARRAY", "items": { "type": "STRING" } },
            "confidence": { "type": "NUMBER" },
            "endScreenConfig": {
                "type": "OBJECT",
                "properties": {
                    "subscribe": { "type": "BOOLEAN" },
                    "recommendedVideos": { "type": "NUMBER" }
                },
                "required": ["subscribe", "recommendedVideos"]
            }
        },
        "required": [
            "script", "title", "description", "tags", "hashtags",
            "pinnedComment", "seoKeywords", "confidence", "endScreenConfig"
        ]
    })
}

/// Thumbnail request for one stylistic variant.
pub fn thumbnail_prompt(title: &str, variant: &ThumbnailVariant) -> String {
    format!(
        "A high-contrast vertical 9:16 YouTube thumbnail for a video titled: \"{}\". Use bold text, a clear human subject, and professional lighting. Variant {}: {}.",
        title, variant.label, variant.direction
    )
}

/// Video request built from the full script.
pub fn video_prompt(script: &str) -> String {
    format!("{}, {}", script.trim(), VIDEO_STYLE_SUFFIX)
}

/// Voice-over request built from the full script.
pub fn voiceover_prompt(script: &str) -> String {
    format!(
        "Say this naturally, like a friendly human YouTuber: {}",
        script.trim()
    )
}
