//! Temp artifact management.
//!
//! Every file this application drops into the temp directory carries a
//! fixed name prefix, so stale files from a crashed session can be found
//! and purged on the next start.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use log::{debug, info, warn};

use crate::id::random_component;

/// Name prefix marking files owned by this application.
pub const DEFAULT_PREFIX: &str = "MagickCanvas.";

/// What a temp artifact holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Generated script body
    Script,
    /// Image written by the external tool
    Image,
}

/// A temp file path owned by the [`TempFileManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempArtifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

impl TempArtifact {
    /// Whether the file currently exists on disk.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// Allocates prefixed temp paths and sweeps them away again.
#[derive(Debug, Clone)]
pub struct TempFileManager {
    dir: PathBuf,
    prefix: String,
}

impl TempFileManager {
    /// Manager over the system temp directory.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_dir(std::env::temp_dir(), prefix)
    }

    /// Manager over an explicit directory.
    pub fn with_dir(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Directory artifacts are placed in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Marker prefix shared by every artifact name.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate `<dir>/<prefix><random>.<extension>`.
    ///
    /// The file is not created. A leading dot on `extension` is optional.
    pub fn new_path(&self, extension: &str) -> PathBuf {
        let extension = extension.trim_start_matches('.');
        let name = format!("{}{}.{}", self.prefix, random_component(), extension);
        self.dir.join(name)
    }

    /// Allocate a path for an artifact of `kind`.
    pub fn allocate(&self, kind: ArtifactKind, extension: &str) -> TempArtifact {
        let path = self.new_path(extension);
        debug!("Allocated {:?} artifact at {}", kind, path.display());
        TempArtifact { path, kind }
    }

    /// Delete every file in the directory whose name starts with the prefix.
    ///
    /// Each deletion is attempted independently; failures are logged and
    /// skipped. Returns the number of files removed.
    pub fn sweep(&self) -> usize {
        let Some(pattern) = glob_in(&self.dir, &self.prefix) else {
            warn!("Temp directory {} is not valid UTF-8, skipping sweep", self.dir.display());
            return 0;
        };

        let entries = match glob::glob(&pattern) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Invalid sweep pattern {}: {}", pattern, e);
                return 0;
            }
        };

        let mut removed = 0;
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => {
                    if remove_quietly(&path) {
                        removed += 1;
                    }
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable temp entry: {}", e),
            }
        }

        if removed > 0 {
            info!("Swept {} stale temp artifacts from {}", removed, self.dir.display());
        }
        removed
    }
}

/// Build a glob pattern with both the directory and prefix escaped.
fn glob_in(dir: &Path, prefix: &str) -> Option<String> {
    let dir = dir.to_str()?;
    Some(format!(
        "{}{}{}*",
        Pattern::escape(dir.trim_end_matches(std::path::MAIN_SEPARATOR)),
        std::path::MAIN_SEPARATOR,
        Pattern::escape(prefix)
    ))
}

/// Best-effort delete. A missing file counts as nothing to do.
pub fn remove_quietly(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed {}", path.display());
            true
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            warn!("Failed to remove {}: {}", path.display(), e);
            false
        }
    }
}
