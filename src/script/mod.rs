//! Script building - Turn editor text into a runnable script body
//!
//! Each non-blank, non-comment line of a canvas document is one argument
//! token for the external tool. The builder joins them into a single
//! invocation and wraps it in a small shell prologue.

mod builder;
mod dialect;

pub use builder::{ScriptSpec, argument_line};
pub use dialect::ScriptDialect;
