//! Raw document text on disk.

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::{CanvasError, Result};

/// File extension for canvas documents.
pub const DOCUMENT_EXTENSION: &str = "mkc";

/// Reads and writes document text as UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilePersistence;

impl FilePersistence {
    /// Read the whole file. Fails if it cannot be opened or is not UTF-8.
    pub fn read(path: &Path) -> Result<String> {
        let text = fs::read_to_string(path).map_err(|source| CanvasError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Read {} bytes from {}", text.len(), path.display());
        Ok(text)
    }

    /// Replace the file's contents with `text`.
    pub fn write(path: &Path, text: &str) -> Result<()> {
        fs::write(path, text).map_err(|source| CanvasError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Wrote {} bytes to {}", text.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read_multiline_unicode() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.mkc");
        let text = "# Überschrift – 見出し\r\nrose:\n-annotate +5+5 \"héllo ✓\"\n\n-resize 50%";

        FilePersistence::write(&path, text).unwrap();
        assert_eq!(FilePersistence::read(&path).unwrap(), text);
    }

    #[test]
    fn test_write_overwrites() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.mkc");

        FilePersistence::write(&path, "first version that is long").unwrap();
        FilePersistence::write(&path, "second").unwrap();
        assert_eq!(FilePersistence::read(&path).unwrap(), "second");
    }

    #[test]
    fn test_read_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = FilePersistence::read(&temp.path().join("missing.mkc")).unwrap_err();
        assert!(matches!(err, CanvasError::Read { .. }));
    }

    #[test]
    fn test_read_invalid_utf8() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("binary.mkc");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let err = FilePersistence::read(&path).unwrap_err();
        assert!(matches!(err, CanvasError::Read { .. }));
    }

    #[test]
    fn test_write_into_missing_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nope").join("doc.mkc");

        let err = FilePersistence::write(&path, "x").unwrap_err();
        assert!(matches!(err, CanvasError::Write { .. }));
    }
}
