//! Theme catalog used when the caller leaves the topic blank.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Built-in short-form content themes.
pub const DEFAULT_THEMES: [&str; 7] = [
    "Quick Tips",
    "Micro-Stories",
    "Product Hacks",
    "60-Second Explainers",
    "Daily Motivation",
    "Micro-Reviews",
    "Trending Reactions",
];

/// Fixed, non-empty list of theme labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ThemeCatalog(Vec<String>);

impl ThemeCatalog {
    /// Build a catalog from labels, dropping blanks and duplicates.
    ///
    /// Returns `None` when no usable label remains.
    pub fn new<I, S>(themes: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<String> = Vec::new();
        for theme in themes {
            let theme = theme.into().trim().to_string();
            if !theme.is_empty() && !labels.contains(&theme) {
                labels.push(theme);
            }
        }
        if labels.is_empty() {
            None
        } else {
            Some(Self(labels))
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, theme: &str) -> bool {
        self.0.iter().any(|t| t == theme)
    }
}

impl Default for ThemeCatalog {
    fn default() -> Self {
        Self(DEFAULT_THEMES.iter().map(|t| t.to_string()).collect())
    }
}
