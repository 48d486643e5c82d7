//! Crafti Core Library
//!
//! This crate provides the core functionality for the Crafti component
//! studio, including:
//! - Session management (create, select, duplicate, rename, delete)
//! - The workspace state machine and its generation lifecycle
//! - Element property editing
//! - SQLite-based persistence and artifact export
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       crafti-core                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  workspace/    - State, intents, reducer, controller        │
//! │  presentation/ - Session list, chat, preview, editor views  │
//! │  services/     - Generation, session store, export          │
//! │  storage/      - SQLite database, queries                   │
//! │  types/        - Shared type definitions                    │
//! │  demo.rs       - Seed sessions and canned component        │
//! │  error.rs      - Error types                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod demo;
pub mod error;
pub mod presentation;
pub mod services;
pub mod storage;
pub mod types;
pub mod workspace;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;

pub use workspace::{
    reduce, Completion, Effect, GenerationTicket, Intent, Notification, WorkspaceController,
    WorkspaceEvent, WorkspaceState,
};

pub use services::{
    generate_with_retry, Blob, CannedGenerationService, Exporter, GenerationService,
    InMemorySessionStore, JsonBundleExporter, RetryPolicy, SessionStore,
};

pub use storage::{SqliteSessionStore, Storage};
