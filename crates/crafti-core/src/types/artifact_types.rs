//! Generated component artifact types

use serde::{Deserialize, Serialize};

/// The generated component: source, stylesheet and a renderable preview.
/// Versionless; attaching a new one replaces the old.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArtifact {
    /// Component source (JSX/TSX)
    pub markup: String,
    /// Stylesheet source
    pub stylesheet: String,
    /// HTML fragment for the live preview
    pub preview: String,
}

impl GeneratedArtifact {
    pub fn new(
        markup: impl Into<String>,
        stylesheet: impl Into<String>,
        preview: impl Into<String>,
    ) -> Self {
        Self {
            markup: markup.into(),
            stylesheet: stylesheet.into(),
            preview: preview.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.markup.trim().is_empty()
            && self.stylesheet.trim().is_empty()
            && self.preview.trim().is_empty()
    }
}

/// Output of one generation round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    /// Assistant reply appended to the transcript
    pub reply: String,
    pub artifact: GeneratedArtifact,
}
