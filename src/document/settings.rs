//! Remembered document location.
//!
//! Two values survive a restart: the last document file and its directory.
//! Stores are loaded once at startup and saved explicitly by
//! [`DocumentState`](super::DocumentState) after each Open, SaveAs, or New.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::{CanvasError, Result};

/// Persisted settings. Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Directory scripts run in.
    #[serde(rename = "working-directory")]
    pub working_directory: String,

    /// Last opened or saved document.
    #[serde(rename = "working-file")]
    pub working_file: String,
}

/// Where [`Settings`] are kept between sessions.
pub trait SettingsStore: Send {
    /// Read the stored settings. A store with nothing saved yields defaults.
    fn load(&self) -> Result<Settings>;

    /// Replace the stored settings.
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// Settings kept in a YAML file.
#[derive(Debug, Clone)]
pub struct YamlSettingsStore {
    path: PathBuf,
}

impl YamlSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.config/magick-canvas/settings.yml`, or the platform equivalent.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("settings.yml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for YamlSettingsStore {
    fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            log::debug!("No settings at {}, starting fresh", self.path.display());
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }
        let settings: Settings = serde_yaml::from_str(&content)?;

        log::info!("Loaded settings from: {}", self.path.display());
        Ok(settings)
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CanvasError::Settings(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        let content = serde_yaml::to_string(settings)?;
        fs::write(&self.path, content)?;
        log::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

/// Settings kept in memory. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    settings: Arc<Mutex<Settings>>,
    saves: Arc<Mutex<usize>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `settings`.
    pub fn with(settings: Settings) -> Self {
        Self {
            settings: Arc::new(Mutex::new(settings)),
            saves: Arc::default(),
        }
    }

    /// Current stored value.
    pub fn current(&self) -> Settings {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// How many times `save` has been called.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings> {
        Ok(self.current())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner) = settings.clone();
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}
