//! Session/workspace state machine
//!
//! This module handles:
//! - Workspace state (`Browsing` / `Editing(session)`)
//! - The pure reducer from intents to effects
//! - The controller that executes effects and runs generation tasks

mod controller;
mod intent;
mod reducer;
mod state;

pub use controller::{Completion, WorkspaceController, WorkspaceEvent};
pub use intent::{Effect, Intent, Notification};
pub use reducer::reduce;
pub use state::{GenerationTicket, WorkspaceState};
