//! Headless view models for the four presentation surfaces
//!
//! Each surface is a function of `WorkspaceState` plus, at most, a little
//! local state (filter text, preview viewport). None of them hold durable
//! data; they render snapshots and hand intents back to the controller.

mod chat;
mod preview;
mod property_editor;
mod session_list;

pub use chat::{chat_view, ChatMessageView, ChatView};
pub use preview::{PreviewSurface, PreviewTab, PreviewView, Viewport};
pub use property_editor::{property_editor_view, EditorTab, PropertyEditorView, PropertyField};
pub use session_list::{
    filter_sessions, format_last_modified, session_list, SessionListSurface, SessionListView,
    SessionRow,
};
