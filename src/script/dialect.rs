//! Shell flavours a generated script can be written in.

use serde::{Deserialize, Serialize};

/// The shell that interprets a generated script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptDialect {
    /// Windows batch file run by `cmd.exe`
    Cmd,
    /// POSIX shell script run by `sh`
    Posix,
}

impl ScriptDialect {
    /// The dialect matching the host platform.
    pub fn native() -> Self {
        if cfg!(windows) { Self::Cmd } else { Self::Posix }
    }

    /// File extension for script files, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Cmd => "cmd",
            Self::Posix => "sh",
        }
    }

    /// Line terminator used inside the script body.
    pub fn line_ending(&self) -> &'static str {
        match self {
            Self::Cmd => "\r\n",
            Self::Posix => "\n",
        }
    }

    /// Lines that silence command echo and force a UTF-8 console.
    pub fn prologue(&self) -> &'static [&'static str] {
        match self {
            Self::Cmd => &["@echo off", "chcp 65001>nul"],
            Self::Posix => &["set +x", "LC_ALL=C.UTF-8", "export LC_ALL"],
        }
    }
}

impl Default for ScriptDialect {
    fn default() -> Self {
        Self::native()
    }
}
