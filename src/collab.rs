//! Collaborator seams for the presentation layer.
//!
//! The core never renders anything itself. It writes console blocks and
//! hands finished images to whatever implements these traits: a GUI, the
//! terminal front-end in `main.rs`, or the in-memory versions used by tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use colored::*;
use log::warn;

/// Receives console output produced around a script run.
pub trait Console: Send + Sync {
    /// Append one discrete block of text.
    fn append(&self, text: &str);

    /// Remove everything shown so far.
    fn clear(&self);
}

/// Receives the image produced by a run.
///
/// The file at `path` is deleted once the run finishes, so implementations
/// must load or copy it before returning.
pub trait ImageDisplay: Send + Sync {
    fn set_image(&self, path: &Path);
}

/// Console that keeps blocks in memory.
#[derive(Debug, Default)]
pub struct MemoryConsole {
    blocks: Mutex<Vec<String>>,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the blocks appended so far.
    pub fn blocks(&self) -> Vec<String> {
        self.blocks.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// All blocks joined into one string.
    pub fn text(&self) -> String {
        self.blocks().concat()
    }
}

impl Console for MemoryConsole {
    fn append(&self, text: &str) {
        if let Ok(mut blocks) = self.blocks.lock() {
            blocks.push(text.to_string());
        }
    }

    fn clear(&self) {
        if let Ok(mut blocks) = self.blocks.lock() {
            blocks.clear();
        }
    }
}

/// Console that prints each block to stdout.
#[derive(Debug, Default)]
pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn append(&self, text: &str) {
        let text = text.trim_end_matches(['\r', '\n']);
        println!("{}", "──".dimmed());
        println!("{}", text);
    }

    fn clear(&self) {
        // Terminal output cannot be retracted; mark the boundary instead
        println!("{}", "── console cleared ──".dimmed());
    }
}

/// Display that keeps the bytes of the last image it was shown.
#[derive(Debug, Default)]
pub struct MemoryDisplay {
    shown: Mutex<Option<(PathBuf, Vec<u8>)>>,
}

impl MemoryDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path and contents of the last image shown, if any.
    pub fn last(&self) -> Option<(PathBuf, Vec<u8>)> {
        self.shown.lock().ok().and_then(|s| s.clone())
    }
}

impl ImageDisplay for MemoryDisplay {
    fn set_image(&self, path: &Path) {
        match fs::read(path) {
            Ok(bytes) => {
                if let Ok(mut shown) = self.shown.lock() {
                    *shown = Some((path.to_path_buf(), bytes));
                }
            }
            Err(e) => warn!("Could not load image {}: {}", path.display(), e),
        }
    }
}

/// Display that copies each image it is shown to a fixed destination.
#[derive(Debug)]
pub struct ExportDisplay {
    dest: PathBuf,
    exported: Mutex<bool>,
}

impl ExportDisplay {
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Self {
            dest: dest.into(),
            exported: Mutex::new(false),
        }
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Whether an image has been copied to the destination.
    pub fn exported(&self) -> bool {
        self.exported.lock().map(|e| *e).unwrap_or(false)
    }
}

impl ImageDisplay for ExportDisplay {
    fn set_image(&self, path: &Path) {
        match fs::copy(path, &self.dest) {
            Ok(_) => {
                if let Ok(mut exported) = self.exported.lock() {
                    *exported = true;
                }
            }
            Err(e) => warn!("Could not export {} to {}: {}", path.display(), self.dest.display(), e),
        }
    }
}
