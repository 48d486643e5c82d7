//! Workspace state

use crate::types::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Identifies one generation request. Every send issues a fresh ticket, so a
/// result can only settle the request that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GenerationTicket(pub u64);

impl fmt::Display for GenerationTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything the presentation surfaces render from
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceState {
    pub view: View,
    /// Session metadata, newest first
    pub sessions: Vec<Session>,
    /// Transcript of the active session
    pub transcript: Vec<Message>,
    /// Artifact of the active session
    pub artifact: Option<GeneratedArtifact>,
    /// Sessions with a pending generation and the ticket it was issued
    pub generating: BTreeMap<SessionId, GenerationTicket>,
    /// Property editor target, present while the editor is open
    pub selected_element: Option<SelectedElement>,
    /// Edits reported since the editor was opened
    pub property_log: Vec<PropertyChange>,
    #[serde(skip)]
    last_ticket: u64,
}

impl WorkspaceState {
    pub fn with_sessions(sessions: Vec<Session>) -> Self {
        Self {
            sessions,
            ..Default::default()
        }
    }

    pub fn active_session_id(&self) -> Option<&SessionId> {
        self.view.active_session()
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.active_session_id().and_then(|id| self.session(id))
    }

    pub fn session(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| &s.id == id)
    }

    pub(crate) fn session_mut(&mut self, id: &SessionId) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| &s.id == id)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.session(id).is_some()
    }

    pub fn is_active(&self, id: &SessionId) -> bool {
        self.active_session_id() == Some(id)
    }

    pub fn is_generating(&self, id: &SessionId) -> bool {
        self.generating.contains_key(id)
    }

    pub fn pending_ticket(&self, id: &SessionId) -> Option<GenerationTicket> {
        self.generating.get(id).copied()
    }

    /// Mark `id` as generating under a new ticket
    pub(crate) fn begin_generation(&mut self, id: SessionId) -> GenerationTicket {
        self.last_ticket += 1;
        let ticket = GenerationTicket(self.last_ticket);
        self.generating.insert(id, ticket);
        ticket
    }

    /// Return to `snapshot`. Tickets already issued are never reissued.
    pub(crate) fn restore(&mut self, snapshot: WorkspaceState) {
        let last_ticket = self.last_ticket;
        *self = snapshot;
        self.last_ticket = last_ticket;
    }

    /// Clear the pending generation if `ticket` is the one outstanding
    pub(crate) fn settle_generation(&mut self, id: &SessionId, ticket: GenerationTicket) -> bool {
        if self.pending_ticket(id) != Some(ticket) {
            return false;
        }
        self.generating.remove(id);
        true
    }

    /// Whether the active session has a pending generation
    pub fn active_is_generating(&self) -> bool {
        self.active_session_id()
            .map(|id| self.is_generating(id))
            .unwrap_or(false)
    }

    pub fn is_property_editor_open(&self) -> bool {
        self.selected_element.is_some()
    }

    /// Drop everything tied to the active session's surfaces
    pub(crate) fn clear_active_view(&mut self) {
        self.transcript.clear();
        self.artifact = None;
        self.selected_element = None;
        self.property_log.clear();
    }
}
