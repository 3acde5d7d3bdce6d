//! CLI module for magick-canvas - command-line interface and subcommands.
//!
//! The terminal front-end stands in for the editor window: it opens a
//! document, runs it, and exports the image instead of displaying it.

pub mod commands;

pub use commands::Cli;
