//! Studio settings

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const SETTINGS_FILE_NAME: &str = "settings.json";
const APP_DIR_NAME: &str = "crafti";

/// Where sessions are kept
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Sqlite,
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::Memory
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudioSettings {
    /// Simulated generation latency
    pub generation_delay_ms: u64,
    /// Per-attempt timeout around the generation service
    pub generation_timeout_ms: u64,
    /// Attempts before a generation is reported as failed
    pub max_generation_attempts: u32,
    pub storage_backend: StorageBackend,
    /// Data directory for the sqlite backend; platform data dir when unset
    pub data_dir: Option<PathBuf>,
    /// Seed the demo sessions into an empty store
    pub seed_demo_sessions: bool,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            generation_delay_ms: 2000,
            generation_timeout_ms: 30_000,
            max_generation_attempts: 2,
            storage_backend: StorageBackend::default(),
            data_dir: None,
            seed_demo_sessions: true,
        }
    }
}

impl StudioSettings {
    /// Default location: `<config dir>/crafti/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    /// Load settings from `path`. A missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&raw)?;
        info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Load from the default location, falling back to defaults
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Resolved data directory for on-disk storage
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join(APP_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from(".crafti"))
        })
    }

    pub fn generation_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.generation_delay_ms)
    }

    pub fn generation_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.generation_timeout_ms)
    }
}
