//! Core type definitions for Crafti
//!
//! This module contains all shared types used across the workspace,
//! including sessions, transcripts, artifacts, property editor targets
//! and settings.

mod artifact_types;
mod element_types;
mod message_types;
mod session_types;
mod settings_types;

pub use artifact_types::*;
pub use element_types::*;
pub use message_types::*;
pub use session_types::*;
pub use settings_types::*;

use serde::{Deserialize, Serialize};

/// Which top-level view is showing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", content = "sessionId", rename_all = "snake_case")]
pub enum View {
    /// Session list, no active session
    Browsing,
    /// Chat, preview and property editor for one session
    Editing(SessionId),
}

impl View {
    pub fn active_session(&self) -> Option<&SessionId> {
        match self {
            Self::Browsing => None,
            Self::Editing(id) => Some(id),
        }
    }

    pub fn is_browsing(&self) -> bool {
        matches!(self, Self::Browsing)
    }
}

impl Default for View {
    fn default() -> Self {
        Self::Browsing
    }
}
