//! Session list surface

use crate::types::{Session, SessionId};
use crate::workspace::WorkspaceState;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One row of the session list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRow {
    pub id: SessionId,
    pub name: String,
    pub description: String,
    pub last_modified: String,
    pub message_count: u32,
    /// Show the `Component` badge
    pub has_component: bool,
    pub is_active: bool,
    pub is_generating: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListView {
    pub query: String,
    pub rows: Vec<SessionRow>,
    /// Headline and hint shown when no rows match
    pub empty_state: Option<(String, String)>,
}

/// Sessions whose name or description contains `query`, case-insensitively,
/// in collection order
pub fn filter_sessions<'a>(sessions: &'a [Session], query: &str) -> Vec<&'a Session> {
    sessions.iter().filter(|s| s.matches(query)).collect()
}

/// Relative timestamp as shown on session cards
pub fn format_last_modified(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else if days < 7 {
        format!("{}d ago", days)
    } else {
        at.format("%-m/%-d/%Y").to_string()
    }
}

pub fn session_list(state: &WorkspaceState, query: &str) -> SessionListView {
    let now = Utc::now();
    let rows: Vec<SessionRow> = filter_sessions(&state.sessions, query)
        .into_iter()
        .map(|s| SessionRow {
            id: s.id.clone(),
            name: s.name.clone(),
            description: s.description.clone(),
            last_modified: format_last_modified(s.last_modified, now),
            message_count: s.message_count,
            has_component: s.has_component,
            is_active: state.is_active(&s.id),
            is_generating: state.is_generating(&s.id),
        })
        .collect();

    let empty_state = match (rows.is_empty(), query.is_empty()) {
        (false, _) => None,
        (true, true) => Some((
            "No sessions yet".to_string(),
            "Create your first session to get started".to_string(),
        )),
        (true, false) => Some((
            "No sessions found".to_string(),
            "Try a different search term".to_string(),
        )),
    };

    SessionListView {
        query: query.to_string(),
        rows,
        empty_state,
    }
}

/// The session list's only local state: the filter text
#[derive(Debug, Clone, Default)]
pub struct SessionListSurface {
    query: String,
}

impl SessionListSurface {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn render(&self, state: &WorkspaceState) -> SessionListView {
        session_list(state, &self.query)
    }
}
