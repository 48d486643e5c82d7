//! Preview surface

use crate::types::SessionId;
use crate::workspace::WorkspaceState;
use serde::{Deserialize, Serialize};

/// Rendering width selector. Affects layout only, never data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    Mobile,
    Tablet,
    #[default]
    Desktop,
}

impl Viewport {
    /// Maximum frame width in pixels; `None` fills the pane
    pub fn max_width(&self) -> Option<u32> {
        match self {
            Self::Mobile => Some(384),
            Self::Tablet => Some(672),
            Self::Desktop => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewTab {
    #[default]
    Preview,
    Markup,
    Stylesheet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewView {
    pub session_id: SessionId,
    /// `Ready` badge
    pub ready: bool,
    pub generating: bool,
    pub viewport: Viewport,
    pub max_width: Option<u32>,
    pub fullscreen: bool,
    pub tab: PreviewTab,
    /// Content of the selected tab, if an artifact is attached
    pub content: Option<String>,
}

/// Local, non-persisted preview controls
#[derive(Debug, Clone, Default)]
pub struct PreviewSurface {
    pub viewport: Viewport,
    pub tab: PreviewTab,
    pub fullscreen: bool,
}

impl PreviewSurface {
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_tab(&mut self, tab: PreviewTab) {
        self.tab = tab;
    }

    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
    }

    /// Artifact of the active session, `None` while browsing
    pub fn render(&self, state: &WorkspaceState) -> Option<PreviewView> {
        let session_id = state.active_session_id()?.clone();
        let content = state.artifact.as_ref().map(|a| match self.tab {
            PreviewTab::Preview => a.preview.clone(),
            PreviewTab::Markup => a.markup.clone(),
            PreviewTab::Stylesheet => a.stylesheet.clone(),
        });

        Some(PreviewView {
            generating: state.is_generating(&session_id),
            session_id,
            ready: content.is_some(),
            viewport: self.viewport,
            max_width: self.viewport.max_width(),
            fullscreen: self.fullscreen,
            tab: self.tab,
            content,
        })
    }
}
