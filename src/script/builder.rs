//! ScriptBuilder - editor text to argument line to script body.
//!
//! This is a line-oriented pass-through, not a parser. Tokens are never
//! quoted or escaped; a line containing spaces ends up as several
//! arguments, exactly as the user typed them.

use std::path::{Path, PathBuf};

use log::debug;

use super::ScriptDialect;

/// Comment marker for canvas documents.
const COMMENT_PREFIX: char = '#';

/// Join the argument lines of `editor_text` into one space-separated string.
///
/// Lines are split on CR, LF, or CRLF, trimmed, and dropped when blank or
/// when they start with `#`. Survivors keep their original order.
pub fn argument_line(editor_text: &str) -> String {
    editor_text
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_PREFIX))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Everything needed to assemble one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSpec {
    /// Path of the external tool executable
    pub tool_invocation_path: String,
    /// Space-joined argument tokens taken from the document
    pub argument_line: String,
    /// Where the tool is told to write its result
    pub output_image_path: PathBuf,
}

impl ScriptSpec {
    /// Derive a spec from document text.
    pub fn from_text(editor_text: &str, tool_path: impl Into<String>, output_image_path: impl AsRef<Path>) -> Self {
        Self {
            tool_invocation_path: tool_path.into(),
            argument_line: argument_line(editor_text),
            output_image_path: output_image_path.as_ref().to_path_buf(),
        }
    }

    /// The single command line: `<tool> <arguments> <output>`.
    pub fn invocation(&self) -> String {
        let output = self.output_image_path.display();
        if self.argument_line.is_empty() {
            format!("{} {}", self.tool_invocation_path, output)
        } else {
            format!("{} {} {}", self.tool_invocation_path, self.argument_line, output)
        }
    }

    /// Render the full script body for `dialect`.
    pub fn render(&self, dialect: ScriptDialect) -> String {
        let eol = dialect.line_ending();
        let mut body = String::new();
        for line in dialect.prologue() {
            body.push_str(line);
            body.push_str(eol);
        }
        body.push_str(&self.invocation());
        if dialect == ScriptDialect::Posix {
            body.push_str(eol);
        }

        debug!("Built {:?} script: {}", dialect, self.invocation());
        body
    }

    /// Shortcut for `from_text(..).render(..)`.
    pub fn build(editor_text: &str, tool_path: &str, output_image_path: &Path, dialect: ScriptDialect) -> String {
        Self::from_text(editor_text, tool_path, output_image_path).render(dialect)
    }
}
