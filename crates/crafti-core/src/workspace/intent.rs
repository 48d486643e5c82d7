//! Intents, effects and notifications

use super::state::GenerationTicket;
use crate::types::*;
use serde::Serialize;

/// A request to the controller, either from a presentation surface or from
/// a finished background task
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    CreateSession,
    SelectSession(SessionId),
    DeleteSession(SessionId),
    DuplicateSession(SessionId),
    RenameSession {
        id: SessionId,
        name: String,
        description: Option<String>,
    },
    SendMessage {
        text: String,
        image: Option<ImageRef>,
    },
    CancelGeneration(SessionId),
    ReturnToSessions,
    OpenPropertyEditor(SelectedElement),
    ClosePropertyEditor,
    ChangeProperty(ElementProperty),

    // Internal
    SessionLoaded(SessionRecord),
    GenerationFinished {
        session_id: SessionId,
        ticket: GenerationTicket,
        generation: Generation,
    },
    GenerationFailed {
        session_id: SessionId,
        ticket: GenerationTicket,
        reason: String,
    },
}

/// Work the controller carries out after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    CreateRecord(SessionRecord),
    /// Store a copy of `source` under the metadata of `copy`
    DuplicateRecord {
        source: SessionId,
        copy: Session,
    },
    UpdateSession(Session),
    DeleteRecord(SessionId),
    LoadRecord(SessionId),
    AppendMessage {
        session_id: SessionId,
        message: Message,
    },
    SetArtifact {
        session_id: SessionId,
        artifact: GeneratedArtifact,
    },
    StartGeneration {
        session_id: SessionId,
        ticket: GenerationTicket,
        transcript: Vec<Message>,
    },
    CancelGeneration(SessionId),
    Notify(Notification),
}

/// User-facing notice raised by a transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    SessionCreated { session_id: SessionId },
    SessionDeleted { name: String },
    SessionDuplicated { name: String },
    GenerationCompleted { session_id: SessionId, in_background: bool },
    GenerationFailed { session_id: SessionId, reason: String },
    GenerationCancelled { session_id: SessionId },
    PropertyChanged { description: String },
}

impl Notification {
    pub fn title(&self) -> &'static str {
        match self {
            Self::SessionCreated { .. } => "New Session Created",
            Self::SessionDeleted { .. } => "Session deleted",
            Self::SessionDuplicated { .. } => "Session duplicated",
            Self::GenerationCompleted { .. } => "Component Generated!",
            Self::GenerationFailed { .. } => "Generation failed",
            Self::GenerationCancelled { .. } => "Generation cancelled",
            Self::PropertyChanged { .. } => "Property Updated",
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::SessionCreated { .. } => "Ready to start building your component!".to_string(),
            Self::SessionDeleted { name } => format!("\"{}\" has been removed.", name),
            Self::SessionDuplicated { name } => format!("Created a copy of \"{}\".", name),
            Self::GenerationCompleted { in_background: false, .. } => {
                "Your component is ready for preview and export.".to_string()
            }
            Self::GenerationCompleted { session_id, in_background: true } => {
                format!("A component finished generating in session {}.", session_id)
            }
            Self::GenerationFailed { reason, .. } => reason.clone(),
            Self::GenerationCancelled { session_id } => {
                format!("Stopped generating in session {}.", session_id)
            }
            Self::PropertyChanged { description } => description.clone(),
        }
    }
}
