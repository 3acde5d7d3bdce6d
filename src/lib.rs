//! MagickCanvas - write image-tool argument scripts and run them
//!
//! A canvas document is a list of command-line arguments for an external
//! image tool, one per line, with `#` comments. MagickCanvas turns the
//! document into a script, runs it with output captured, hands the
//! resulting image to a display, and cleans up after itself.

pub mod canvas;
pub mod collab;
pub mod config;
pub mod document;
pub mod error;
pub mod id;
pub mod runner;
pub mod script;
pub mod temp;

pub use canvas::Canvas;
pub use error::{CanvasError, Result};
