//! Error types for Crafti Core

use thiserror::Error;

/// Main error type for Crafti operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors reported back to a presentation surface for a rejected intent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Session is busy generating: {0}")]
    Busy(String),

    #[error("No active session")]
    NoActiveSession,

    #[error("No element selected")]
    NoSelection,
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Connection pool error: {0}")]
    Pool(String),
}

/// Generation service errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Generation timed out after {0} ms")]
    Timeout(u64),

    #[error("Generation failed: {0}")]
    Failed(String),
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export")]
    EmptyArtifact,

    #[error("Bundle encoding failed: {0}")]
    Encoding(String),
}

impl Error {
    /// The workspace-level rejection carried by this error, if any
    pub fn as_workspace(&self) -> Option<&WorkspaceError> {
        match self {
            Error::Workspace(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Storage(StorageError::Database(err.to_string()))
    }
}

impl From<r2d2::Error> for Error {
    fn from(err: r2d2::Error) -> Self {
        Error::Storage(StorageError::Pool(err.to_string()))
    }
}

impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;
