//! Artifact export

use crate::error::{ExportError, Result};
use crate::types::GeneratedArtifact;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub const BUNDLE_FILE_NAME: &str = "component.zip";
pub const BUNDLE_MIME_TYPE: &str = "application/json";
const README: &str = "# Generated Component\n\nCreated with Crafti AI Studio";

/// Downloadable export payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    /// Hex-encoded SHA-256 of `bytes`
    pub checksum: String,
}

impl Blob {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let checksum = hex::encode(Sha256::digest(&bytes));
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
            checksum,
        }
    }

    /// Write the blob into `dir` under its file name
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        info!("Exported {} ({} bytes) to {:?}", self.file_name, self.bytes.len(), path);
        Ok(path)
    }
}

/// Packages an artifact for download
pub trait Exporter: Send + Sync {
    fn export(&self, artifact: &GeneratedArtifact) -> Result<Blob>;
}

/// Bundles the component sources and a README as a JSON file map
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonBundleExporter;

impl Exporter for JsonBundleExporter {
    fn export(&self, artifact: &GeneratedArtifact) -> Result<Blob> {
        if artifact.is_empty() {
            return Err(ExportError::EmptyArtifact.into());
        }

        let mut files = BTreeMap::new();
        files.insert("component.tsx", artifact.markup.as_str());
        files.insert("component.css", artifact.stylesheet.as_str());
        files.insert("README.md", README);

        let bytes = serde_json::to_vec_pretty(&files)
            .map_err(|e| ExportError::Encoding(e.to_string()))?;

        Ok(Blob::new(BUNDLE_FILE_NAME, BUNDLE_MIME_TYPE, bytes))
    }
}
