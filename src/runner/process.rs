//! ProcessRunner - write a script, run it, capture what it prints.
//!
//! The runner never looks at the child's exit status to decide anything.
//! A run "worked" when the tool left an image at the output path; any
//! diagnostics the tool printed are passed through as console text.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use chrono::{DateTime, Local};
use log::{debug, info, warn};
use serde::Serialize;

use super::guard::ExecutionGuard;
use crate::collab::{Console, ImageDisplay};
use crate::error::{CanvasError, Result};
use crate::script::ScriptDialect;
use crate::temp::remove_quietly;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Inputs for a single run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Rendered script body
    pub script_body: String,
    /// Where the script body is written before launch
    pub script_path: PathBuf,
    /// Where the tool is expected to write its image
    pub output_image_path: PathBuf,
    /// Working directory for the child process
    pub working_directory: PathBuf,
    /// Echo the script body to the console before running it
    pub show_script: bool,
}

/// Captured outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    /// Raw exit status of the child. Recorded, never acted on.
    pub exit_succeeded: bool,
    /// Output path the tool was given; gone once the run returns
    pub output_image_path: PathBuf,
    /// Whether an image existed at `output_image_path` after the child exited
    pub image_produced: bool,
    pub finished_at: DateTime<Local>,
}

impl ExecutionResult {
    /// stdout followed by stderr.
    pub fn combined_output(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }

    /// A run succeeded when the tool produced an image.
    pub fn succeeded(&self) -> bool {
        self.image_produced
    }
}

/// Runs generated scripts, one at a time.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    guard: ExecutionGuard,
    dialect: ScriptDialect,
}

impl ProcessRunner {
    pub fn new(dialect: ScriptDialect) -> Self {
        Self {
            guard: ExecutionGuard::new(),
            dialect,
        }
    }

    pub fn dialect(&self) -> ScriptDialect {
        self.dialect
    }

    /// Whether a run is in flight.
    pub fn is_busy(&self) -> bool {
        self.guard.is_busy()
    }

    /// Execute `request`, blocking until the child exits.
    ///
    /// Returns `None` without doing anything when another run holds the
    /// slot. Otherwise the script and image files are removed and the slot
    /// released before this returns, whatever happened in between.
    pub fn run(&self, request: &RunRequest, console: &dyn Console, display: &dyn ImageDisplay) -> Option<ExecutionResult> {
        let _token = match self.guard.try_acquire() {
            Ok(token) => token,
            Err(e) => {
                debug!("Run request dropped: {}", e);
                return None;
            }
        };
        // Declared after the token so the files are gone before the slot frees up
        let _cleanup = ArtifactCleanup(vec![request.script_path.clone(), request.output_image_path.clone()]);

        info!(
            "Running {} in {}",
            request.script_path.display(),
            request.working_directory.display()
        );

        let (stdout, stderr, exit_succeeded) = match self.execute(request, console) {
            Ok(output) => (
                String::from_utf8_lossy(&output.stdout).into_owned(),
                String::from_utf8_lossy(&output.stderr).into_owned(),
                output.status.success(),
            ),
            Err(e) => {
                warn!("Script run failed: {}", e);
                (String::new(), e.to_string(), false)
            }
        };

        if !stdout.is_empty() {
            console.append(&stdout);
        }
        if !stderr.is_empty() {
            console.append(&stderr);
        }

        let image_produced = request.output_image_path.is_file();
        if image_produced {
            display.set_image(&request.output_image_path);
        } else {
            debug!("No image at {}", request.output_image_path.display());
        }

        Some(ExecutionResult {
            stdout,
            stderr,
            exit_succeeded,
            output_image_path: request.output_image_path.clone(),
            image_produced,
            finished_at: Local::now(),
        })
    }

    fn execute(&self, request: &RunRequest, console: &dyn Console) -> Result<Output> {
        fs::write(&request.script_path, &request.script_body).map_err(|source| CanvasError::Write {
            path: request.script_path.clone(),
            source,
        })?;

        if request.show_script {
            console.append(&request.script_body);
        }

        self.command(&request.script_path, &request.working_directory)
            .output()
            .map_err(|e| CanvasError::ProcessLaunch(format!("{}: {}", request.script_path.display(), e)))
    }

    fn command(&self, script_path: &Path, working_directory: &Path) -> Command {
        let mut cmd = match self.dialect {
            ScriptDialect::Cmd => Command::new(script_path),
            ScriptDialect::Posix => {
                let mut cmd = Command::new("sh");
                cmd.arg(script_path);
                cmd
            }
        };

        cmd.current_dir(working_directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        cmd
    }
}

/// Removes the listed files when dropped.
struct ArtifactCleanup(Vec<PathBuf>);

impl Drop for ArtifactCleanup {
    fn drop(&mut self) {
        for path in &self.0 {
            remove_quietly(path);
        }
    }
}
