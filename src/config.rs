use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::YamlSettingsStore;
use crate::script::ScriptDialect;
use crate::temp::DEFAULT_PREFIX;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub log_level: Option<String>,
    /// External tool invoked by every script
    pub tool_path: String,
    /// Echo each script body to the console before running it
    pub show_script: bool,
    /// Name prefix for temp artifacts
    pub temp_prefix: String,
    /// Extension of the image the tool is asked to write
    pub image_extension: String,
    /// Script flavour; `None` picks the host's native shell
    pub dialect: Option<ScriptDialect>,
    /// Where the last document location is remembered
    pub settings_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            tool_path: default_tool_path(),
            show_script: false,
            temp_prefix: DEFAULT_PREFIX.to_string(),
            image_extension: "png".to_string(),
            dialect: None,
            settings_path: None,
        }
    }
}

/// Bundled `imagemagick/magick` next to the executable, else `magick` on PATH.
fn default_tool_path() -> String {
    let exe_name = if cfg!(windows) { "magick.exe" } else { "magick" };
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("imagemagick").join(exe_name)))
        .filter(|bundled| bundled.is_file())
        .map(|bundled| bundled.to_string_lossy().into_owned())
        .unwrap_or_else(|| "magick".to_string())
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_name = env!("CARGO_PKG_NAME");

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.tool_path.trim().is_empty() {
            eyre::bail!("tool-path must not be empty");
        }
        if self.temp_prefix.is_empty() {
            eyre::bail!("temp-prefix must not be empty");
        }
        if self.image_extension.trim_start_matches('.').is_empty() {
            eyre::bail!("image-extension must not be empty");
        }
        Ok(())
    }

    /// Log filter: `RUST_LOG` when set, else `log-level`, else `info`.
    pub fn log_filter(&self) -> String {
        self.log_filter_with(std::env::var("RUST_LOG").ok())
    }

    fn log_filter_with(&self, env_filter: Option<String>) -> String {
        env_filter
            .filter(|f| !f.trim().is_empty())
            .or_else(|| self.log_level.clone())
            .unwrap_or_else(|| "info".to_string())
    }

    /// The script flavour in effect.
    pub fn dialect(&self) -> ScriptDialect {
        self.dialect.unwrap_or_else(ScriptDialect::native)
    }

    /// Settings store at `settings-path`, or the per-user default.
    pub fn settings_store(&self) -> YamlSettingsStore {
        let path = self
            .settings_path
            .clone()
            .or_else(YamlSettingsStore::default_path)
            .unwrap_or_else(|| PathBuf::from("settings.yml"));
        YamlSettingsStore::new(path)
    }
}
