//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - run: execute a canvas document
//! - new: forget the remembered document
//! - status: show the remembered document
//! - sweep: purge stale temp files
//! - save-as: store a document under a new path

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// MagickCanvas - run ImageMagick argument scripts
#[derive(Parser, Debug)]
#[command(name = "magick-canvas")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (echoes each generated script)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a canvas document and export the image it produces
    Run {
        /// Document to run (defaults to the remembered document)
        file: Option<PathBuf>,

        /// Where to copy the produced image (default: ./output.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Echo the generated script before running it
        #[arg(long)]
        show_script: bool,

        /// Print the execution result as JSON instead of console blocks
        #[arg(long)]
        json: bool,
    },

    /// Start a new untitled document, forgetting the remembered one
    New,

    /// Show the remembered document and resolved tool
    Status,

    /// Delete temp files left behind by earlier sessions
    Sweep,

    /// Save a document under a new path and remember it
    SaveAs {
        /// Destination path
        path: PathBuf,

        /// Take the text from this file instead of the remembered document
        #[arg(short, long)]
        from: Option<PathBuf>,
    },
}
