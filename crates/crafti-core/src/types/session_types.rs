//! Session types

use super::{GeneratedArtifact, Message};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_SESSION_DESCRIPTION: &str = "Start building your component...";
pub const COPY_SUFFIX: &str = " (Copy)";

/// Unique identifier for a session
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Allocate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Session metadata shown in the session list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub description: String,
    pub last_modified: chrono::DateTime<chrono::Utc>,
    pub message_count: u32,
    pub has_component: bool,
}

impl Session {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: SessionId::generate(),
            name: name.into(),
            description: description.into(),
            last_modified: chrono::Utc::now(),
            message_count: 0,
            has_component: false,
        }
    }

    /// Copy of the metadata under a new id. Transcript-derived fields are reset.
    pub fn duplicate(&self) -> Self {
        Self {
            id: SessionId::generate(),
            name: format!("{}{}", self.name, COPY_SUFFIX),
            description: self.description.clone(),
            last_modified: chrono::Utc::now(),
            message_count: 0,
            has_component: self.has_component,
        }
    }

    pub fn touch(&mut self) {
        self.last_modified = chrono::Utc::now();
    }

    /// Case-insensitive substring match over name or description
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}

/// A session together with its transcript and artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session: Session,
    pub transcript: Vec<Message>,
    pub artifact: Option<GeneratedArtifact>,
}

impl SessionRecord {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            transcript: Vec::new(),
            artifact: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.session.id
    }

    /// Attach or replace the artifact, keeping `has_component` in step
    pub fn set_artifact(&mut self, artifact: GeneratedArtifact) {
        self.artifact = Some(artifact);
        self.session.has_component = true;
    }

    pub fn push_message(&mut self, message: Message) {
        self.transcript.push(message);
        self.session.message_count = self.session.message_count.saturating_add(1);
        self.session.touch();
    }
}
