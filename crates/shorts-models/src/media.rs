//! Media handles produced by the media synthesis step.

use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A locally consumable media resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaHandle {
    /// Inline base64 payload
    DataUri {
        #[serde(rename = "mimeType")]
        mime_type: String,
        data: String,
    },
    /// File materialized in the media directory
    File {
        #[serde(rename = "mimeType")]
        mime_type: String,
        path: PathBuf,
    },
}

impl MediaHandle {
    pub fn data_uri(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::DataUri {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn file(mime_type: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::File {
            mime_type: mime_type.into(),
            path: path.into(),
        }
    }

    pub fn mime_type(&self) -> &str {
        match self {
            MediaHandle::DataUri { mime_type, .. } | MediaHandle::File { mime_type, .. } => {
                mime_type
            }
        }
    }

    /// Full `data:` URI for inline payloads.
    pub fn as_data_uri(&self) -> Option<String> {
        match self {
            MediaHandle::DataUri { mime_type, data } => {
                Some(format!("data:{};base64,{}", mime_type, data))
            }
            MediaHandle::File { .. } => None,
        }
    }

    /// Local path for file-backed handles.
    pub fn path(&self) -> Option<&Path> {
        match self {
            MediaHandle::File { path, .. } => Some(path.as_path()),
            MediaHandle::DataUri { .. } => None,
        }
    }

    /// File name for file-backed handles.
    pub fn file_name(&self) -> Option<&str> {
        self.path()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
    }
}

/// A thumbnail prompt variant ("A: Action-oriented", "B: Emotive-oriented", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ThumbnailVariant {
    /// Variant label shown next to the image
    pub label: String,
    /// Stylistic direction added to the prompt
    pub direction: String,
}

impl ThumbnailVariant {
    pub fn new(label: impl Into<String>, direction: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            direction: direction.into(),
        }
    }

    /// The two variants requested by default.
    pub fn defaults() -> Vec<ThumbnailVariant> {
        vec![
            ThumbnailVariant::new("A", "Action-oriented"),
            ThumbnailVariant::new("B", "Emotive-oriented"),
        ]
    }
}

/// A generated thumbnail and the variant it was produced for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Thumbnail {
    pub variant: String,
    pub image: MediaHandle,
}

/// Joined output of the media synthesis fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MediaBundle {
    pub video: MediaHandle,
    pub voiceover: MediaHandle,
    pub thumbnails: Vec<Thumbnail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri() {
        let handle = MediaHandle::data_uri("image/png", "AAAA");
        assert_eq!(handle.as_data_uri().as_deref(), Some("data:image/png;base64,AAAA"));
        assert!(handle.path().is_none());
    }

    #[test]
    fn test_file_handle() {
        let handle = MediaHandle::file("video/mp4", "/tmp/media/abc.mp4");
        assert_eq!(handle.file_name(), Some("abc.mp4"));
        assert_eq!(handle.mime_type(), "video/mp4");
        assert!(handle.as_data_uri().is_none());

        let json = serde_json::to_value(&handle).unwrap();
        assert_eq!(json["kind"], "file");
        assert_eq!(json["mimeType"], "video/mp4");
    }

    #[test]
    fn test_default_variants() {
        let variants = ThumbnailVariant::defaults();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].label, "A");
        assert_eq!(variants[1].direction, "Emotive-oriented");
    }
}
