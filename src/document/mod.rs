//! Document handling - the text being edited, where it lives, and whether
//! it has unsaved changes.
//!
//! This module provides:
//! - FilePersistence for reading and writing document text
//! - SettingsStore for remembering the last file across restarts
//! - DocumentState for the New/Open/Save/SaveAs lifecycle

mod persistence;
mod settings;
mod state;

pub use persistence::{DOCUMENT_EXTENSION, FilePersistence};
pub use settings::{MemorySettingsStore, Settings, SettingsStore, YamlSettingsStore};
pub use state::{APP_TITLE, Document, DocumentState};
