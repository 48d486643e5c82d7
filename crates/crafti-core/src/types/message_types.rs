//! Chat message types

use crate::error::{Result, WorkspaceError};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Who wrote a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

/// Image attached to a user message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageRef {
    Url {
        url: String,
    },
    Base64 {
        media_type: String,
        data: String,
        file_name: Option<String>,
    },
}

impl ImageRef {
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url { url: url.into() }
    }

    /// Inline image from raw bytes
    pub fn from_bytes(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::Base64 {
            media_type: media_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            file_name: None,
        }
    }

    /// Read an image from disk, guessing its media type from the extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        if mime.type_() != mime_guess::mime::IMAGE {
            return Err(WorkspaceError::InvalidInput(format!(
                "Not an image: {}",
                path.display()
            ))
            .into());
        }

        let bytes = std::fs::read(path)?;
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);

        Ok(Self::Base64 {
            media_type: mime.essence_str().to_string(),
            data,
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string()),
        })
    }

    /// URL usable as an `<img src>`
    pub fn src(&self) -> String {
        match self {
            Self::Url { url } => url.clone(),
            Self::Base64 { media_type, data, .. } => format!("data:{};base64,{}", media_type, data),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Url { url } => url.rsplit('/').next().unwrap_or(url),
            Self::Base64 { file_name, .. } => file_name.as_deref().unwrap_or("image"),
        }
    }
}

/// A single entry in a session transcript. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub author: Author,
    pub content: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub image: Option<ImageRef>,
}

impl Message {
    pub fn user(content: impl Into<String>, image: Option<ImageRef>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            author: Author::User,
            content: content.into(),
            timestamp: chrono::Utc::now(),
            image,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            author: Author::Assistant,
            content: content.into(),
            timestamp: chrono::Utc::now(),
            image: None,
        }
    }

    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }
}
