//! DocumentState - the New/Open/Save/SaveAs lifecycle.
//!
//! The document is either Clean or Dirty. Loading, saving, and starting a
//! new document make it Clean; any edit makes it Dirty. Prompting the user
//! to save before a destructive action is the caller's job: poll
//! [`DocumentState::is_dirty`] first.

use std::path::{Path, PathBuf};

use log::{info, warn};

use super::persistence::FilePersistence;
use super::settings::{Settings, SettingsStore};
use crate::error::Result;

/// Base window title.
pub const APP_TITLE: &str = "Magick";

/// The text being edited and where it lives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    /// `None` for an untitled document
    pub path: Option<PathBuf>,
    /// Directory scripts run in; `None` means the system temp directory
    pub directory: Option<PathBuf>,
    pub dirty: bool,
}

impl Document {
    pub fn is_untitled(&self) -> bool {
        self.path.is_none()
    }
}

/// Owns the current [`Document`] and keeps the settings store in step.
pub struct DocumentState {
    document: Document,
    store: Box<dyn SettingsStore>,
}

impl std::fmt::Debug for DocumentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentState").field("document", &self.document).finish_non_exhaustive()
    }
}

impl DocumentState {
    /// An empty, clean, untitled document. Nothing is loaded from `store`.
    pub fn new(store: Box<dyn SettingsStore>) -> Self {
        Self {
            document: Document::default(),
            store,
        }
    }

    /// Reopen the document remembered in `store`.
    ///
    /// If the remembered file is gone or unreadable the state falls back
    /// to untitled and the cleared location is written back to the store.
    pub fn restore(store: Box<dyn SettingsStore>) -> Self {
        let settings = store.load().unwrap_or_else(|e| {
            warn!("Failed to load settings, starting untitled: {}", e);
            Settings::default()
        });

        let mut state = Self::new(store);
        let file = PathBuf::from(&settings.working_file);

        if !settings.working_file.is_empty() && file.is_file() {
            match FilePersistence::read(&file) {
                Ok(text) => {
                    let directory = if settings.working_directory.is_empty() {
                        parent_dir(&file)
                    } else {
                        Some(PathBuf::from(&settings.working_directory))
                    };
                    info!("Restored {}", file.display());
                    state.document = Document {
                        text,
                        path: Some(file),
                        directory,
                        dirty: false,
                    };
                    return state;
                }
                Err(e) => warn!("Could not restore remembered document: {}", e),
            }
        } else if !settings.working_file.is_empty() {
            info!("Remembered document {} no longer exists", file.display());
        }

        state.persist();
        state
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn text(&self) -> &str {
        &self.document.text
    }

    pub fn path(&self) -> Option<&Path> {
        self.document.path.as_deref()
    }

    pub fn directory(&self) -> Option<&Path> {
        self.document.directory.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.document.dirty
    }

    /// Text-change notification from the editor.
    pub fn mark_dirty(&mut self) {
        self.document.dirty = true;
    }

    /// Replace the text as an edit; the document becomes Dirty.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.document.text = text.into();
        self.mark_dirty();
    }

    /// Start over with an empty untitled document and forget the location.
    pub fn new_document(&mut self) {
        self.document = Document::default();
        self.persist();
    }

    /// Load `path` and make it the current document.
    ///
    /// On failure the current document is left untouched.
    pub fn open(&mut self, path: &Path) -> Result<String> {
        let text = FilePersistence::read(path)?;
        self.document = Document {
            text: text.clone(),
            path: Some(path.to_path_buf()),
            directory: parent_dir(path),
            dirty: false,
        };
        info!("Opened {}", path.display());
        self.persist();
        Ok(text)
    }

    /// Write the document to `path` and adopt it as the document's location.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        FilePersistence::write(path, &self.document.text)?;
        self.document.path = Some(path.to_path_buf());
        self.document.directory = parent_dir(path);
        self.document.dirty = false;
        info!("Saved as {}", path.display());
        self.persist();
        Ok(())
    }

    /// Write the document to its current path.
    ///
    /// Returns `Ok(false)` without writing when the document is untitled;
    /// the caller must pick a path and use [`save_as`](Self::save_as).
    pub fn save(&mut self) -> Result<bool> {
        let Some(path) = self.document.path.clone() else {
            return Ok(false);
        };
        FilePersistence::write(&path, &self.document.text)?;
        self.document.dirty = false;
        Ok(true)
    }

    /// Window title: `Magick`, `Magick - <file>`, plus ` (unsaved)` when dirty.
    pub fn title(&self) -> String {
        let mut title = match &self.document.path {
            Some(path) => format!("{} - {}", APP_TITLE, path.display()),
            None => APP_TITLE.to_string(),
        };
        if self.document.dirty {
            title.push_str(" (unsaved)");
        }
        title
    }

    /// Directory a run should use: the document's, else the system temp dir.
    pub fn working_directory(&self) -> PathBuf {
        self.document.directory.clone().unwrap_or_else(std::env::temp_dir)
    }

    fn persist(&self) {
        let settings = Settings {
            working_directory: path_string(self.document.directory.as_deref()),
            working_file: path_string(self.document.path.as_deref()),
        };
        if let Err(e) = self.store.save(&settings) {
            warn!("Failed to save settings: {}", e);
        }
    }
}

fn parent_dir(path: &Path) -> Option<PathBuf> {
    path.parent().filter(|p| !p.as_os_str().is_empty()).map(Path::to_path_buf)
}

fn path_string(path: Option<&Path>) -> String {
    path.map(|p| p.to_string_lossy().into_owned()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemorySettingsStore;
    use std::fs;
    use tempfile::TempDir;

    fn fresh() -> (DocumentState, MemorySettingsStore) {
        let store = MemorySettingsStore::new();
        (DocumentState::new(Box::new(store.clone())), store)
    }

    #[test]
    fn test_starts_clean_and_untitled() {
        let (state, _) = fresh();
        assert!(!state.is_dirty());
        assert!(state.document().is_untitled());
        assert_eq!(state.title(), "Magick");
    }

    #[test]
    fn test_edit_marks_dirty() {
        let (mut state, _) = fresh();
        state.set_text("rose:");
        assert!(state.is_dirty());
        assert_eq!(state.title(), "Magick (unsaved)");
    }

    #[test]
    fn test_open_is_clean_and_remembered() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.mkc");
        fs::write(&path, "logo:\n-negate").unwrap();
        let (mut state, store) = fresh();
        state.set_text("scratch");

        let text = state.open(&path).unwrap();

        assert_eq!(text, "logo:\n-negate");
        assert_eq!(state.text(), text);
        assert!(!state.is_dirty());
        assert_eq!(state.directory(), Some(temp.path()));
        assert_eq!(store.current().working_file, path.to_string_lossy());
        assert_eq!(store.current().working_directory, temp.path().to_string_lossy());
    }

    #[test]
    fn test_failed_open_keeps_current_document() {
        let temp = TempDir::new().unwrap();
        let (mut state, store) = fresh();
        state.set_text("keep me");

        assert!(state.open(&temp.path().join("missing.mkc")).is_err());
        assert_eq!(state.text(), "keep me");
        assert!(state.is_dirty());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_save_without_path_is_no_op() {
        let (mut state, store) = fresh();
        state.set_text("rose:");

        assert!(!state.save().unwrap());
        assert!(state.is_dirty());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_save_as_then_save() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("b.mkc");
        let (mut state, store) = fresh();
        state.set_text("rose:");

        state.save_as(&path).unwrap();
        assert!(!state.is_dirty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "rose:");
        assert_eq!(store.current().working_file, path.to_string_lossy());
        assert_eq!(state.title(), format!("Magick - {}", path.display()));

        state.set_text("rose:\n-flip");
        assert_eq!(state.title(), format!("Magick - {} (unsaved)", path.display()));
        assert!(state.save().unwrap());
        assert!(!state.is_dirty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "rose:\n-flip");
    }

    #[test]
    fn test_failed_save_as_stays_dirty() {
        let temp = TempDir::new().unwrap();
        let (mut state, _) = fresh();
        state.set_text("rose:");

        assert!(state.save_as(&temp.path().join("no").join("c.mkc")).is_err());
        assert!(state.is_dirty());
        assert!(state.document().is_untitled());
    }

    #[test]
    fn test_new_document_resets_everything() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("d.mkc");
        fs::write(&path, "wizard:").unwrap();
        let (mut state, store) = fresh();
        state.open(&path).unwrap();
        state.set_text("wizard:\n-swirl 90");
        assert!(state.is_dirty());

        state.new_document();

        assert!(!state.is_dirty());
        assert!(state.text().is_empty());
        assert!(state.path().is_none());
        assert!(state.directory().is_none());
        assert_eq!(store.current(), Settings::default());
    }

    #[test]
    fn test_restore_remembered_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("e.mkc");
        fs::write(&path, "granite:").unwrap();
        let store = MemorySettingsStore::with(Settings {
            working_directory: temp.path().to_string_lossy().into_owned(),
            working_file: path.to_string_lossy().into_owned(),
        });

        let state = DocumentState::restore(Box::new(store.clone()));

        assert_eq!(state.text(), "granite:");
        assert_eq!(state.path(), Some(path.as_path()));
        assert!(!state.is_dirty());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_restore_missing_file_falls_back_to_untitled() {
        let temp = TempDir::new().unwrap();
        let store = MemorySettingsStore::with(Settings {
            working_directory: temp.path().to_string_lossy().into_owned(),
            working_file: temp.path().join("gone.mkc").to_string_lossy().into_owned(),
        });

        let state = DocumentState::restore(Box::new(store.clone()));

        assert!(state.document().is_untitled());
        assert!(state.directory().is_none());
        assert_eq!(store.current(), Settings::default());
    }

    #[test]
    fn test_working_directory_falls_back_to_temp() {
        let (state, _) = fresh();
        assert_eq!(state.working_directory(), std::env::temp_dir());
    }
}
