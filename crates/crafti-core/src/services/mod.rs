//! External collaborators the workspace controller is written against
//!
//! - `GenerationService` - turns a transcript into a component
//! - `SessionStore` - session persistence
//! - `Exporter` - packages an artifact for download

mod export;
mod generation;
mod store;

pub use export::{Blob, Exporter, JsonBundleExporter, BUNDLE_FILE_NAME, BUNDLE_MIME_TYPE};
pub use generation::{generate_with_retry, CannedGenerationService, GenerationService, RetryPolicy};
pub use store::{InMemorySessionStore, SessionStore};

#[cfg(test)]
pub use generation::MockGenerationService;
