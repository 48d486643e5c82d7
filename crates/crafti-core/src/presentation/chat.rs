//! Chat surface

use crate::types::{Author, SessionId};
use crate::workspace::WorkspaceState;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageView {
    pub id: String,
    pub author: Author,
    pub content: String,
    /// Local `HH:MM` label
    pub time: String,
    pub image_src: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatView {
    pub session_id: SessionId,
    pub session_name: String,
    pub messages: Vec<ChatMessageView>,
    /// Busy indicator; sending is disabled while set
    pub generating: bool,
}

impl ChatView {
    /// Whether the send affordance is enabled for this draft
    pub fn can_send(&self, draft: &str, has_image: bool) -> bool {
        !self.generating && (!draft.trim().is_empty() || has_image)
    }
}

/// Transcript of the active session, `None` while browsing
pub fn chat_view(state: &WorkspaceState) -> Option<ChatView> {
    let session = state.active_session()?;

    let messages = state
        .transcript
        .iter()
        .map(|m| ChatMessageView {
            id: m.id.clone(),
            author: m.author,
            content: m.content.clone(),
            time: m.timestamp.with_timezone(&chrono::Local).format("%H:%M").to_string(),
            image_src: m.image.as_ref().map(|i| i.src()),
        })
        .collect();

    Some(ChatView {
        session_id: session.id.clone(),
        session_name: session.name.clone(),
        messages,
        generating: state.is_generating(&session.id),
    })
}
