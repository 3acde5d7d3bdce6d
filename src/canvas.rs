//! Canvas session - wires the document, temp files, and runner together.
//!
//! A `Canvas` lives for the whole process. It sweeps stale temp files and
//! restores the remembered document on start, allocates one script path
//! and one image path for every run it will make, and sweeps again on
//! shutdown.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use tokio::task::JoinHandle;

use crate::collab::{Console, ImageDisplay};
use crate::config::Config;
use crate::document::{DocumentState, SettingsStore};
use crate::runner::{ExecutionResult, ProcessRunner, RunRequest};
use crate::script::ScriptSpec;
use crate::temp::{ArtifactKind, TempArtifact, TempFileManager};

/// One editing session.
#[derive(Debug)]
pub struct Canvas {
    config: Config,
    temp: TempFileManager,
    runner: Arc<ProcessRunner>,
    document: DocumentState,
    script: TempArtifact,
    image: TempArtifact,
}

impl Canvas {
    /// Start a session using the system temp directory.
    pub fn start(config: Config, store: Box<dyn SettingsStore>) -> Self {
        Self::start_in(config, store, std::env::temp_dir())
    }

    /// Start a session with temp artifacts under `temp_dir`.
    pub fn start_in(config: Config, store: Box<dyn SettingsStore>, temp_dir: impl Into<PathBuf>) -> Self {
        let temp = TempFileManager::with_dir(temp_dir, config.temp_prefix.clone());
        temp.sweep();

        let document = DocumentState::restore(store);

        let dialect = config.dialect();
        let script = temp.allocate(ArtifactKind::Script, dialect.extension());
        let image = temp.allocate(ArtifactKind::Image, &config.image_extension);

        info!("Canvas started: {}", document.title());

        Self {
            runner: Arc::new(ProcessRunner::new(dialect)),
            config,
            temp,
            document,
            script,
            image,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> &DocumentState {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut DocumentState {
        &mut self.document
    }

    pub fn script_path(&self) -> &Path {
        &self.script.path
    }

    pub fn image_path(&self) -> &Path {
        &self.image.path
    }

    /// Drives the "executing" indicator.
    pub fn is_executing(&self) -> bool {
        self.runner.is_busy()
    }

    /// Build the run request for the current document text.
    pub fn prepare_run(&self) -> RunRequest {
        let spec = ScriptSpec::from_text(self.document.text(), self.config.tool_path.clone(), &self.image.path);
        RunRequest {
            script_body: spec.render(self.runner.dialect()),
            script_path: self.script.path.clone(),
            output_image_path: self.image.path.clone(),
            working_directory: self.document.working_directory(),
            show_script: self.config.show_script,
        }
    }

    /// Run the current document on this thread, blocking until it exits.
    ///
    /// `None` means another run was already in flight.
    pub fn run(&self, console: &dyn Console, display: &dyn ImageDisplay) -> Option<ExecutionResult> {
        self.runner.run(&self.prepare_run(), console, display)
    }

    /// Run the current document on the blocking pool.
    ///
    /// The request is snapshotted now, so later edits do not affect it.
    /// The handle resolves when the run finishes; awaiting it is the
    /// completion signal. Must be called inside a tokio runtime.
    pub fn spawn_run(
        &self,
        console: Arc<dyn Console>,
        display: Arc<dyn ImageDisplay>,
    ) -> JoinHandle<Option<ExecutionResult>> {
        let request = self.prepare_run();
        let runner = Arc::clone(&self.runner);
        tokio::task::spawn_blocking(move || runner.run(&request, console.as_ref(), display.as_ref()))
    }

    /// End the session, purging this application's temp files.
    ///
    /// Returns the number of files removed.
    pub fn shutdown(self) -> usize {
        info!("Canvas shutting down");
        self.temp.sweep()
    }
}
