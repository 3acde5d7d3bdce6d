//! Script runner module - executes generated scripts one at a time.
//!
//! This module provides:
//! - ExecutionGuard, a single-slot busy flag with an RAII token
//! - ProcessRunner for writing, launching, and cleaning up after a script
//! - ExecutionResult for the captured output of one run

mod guard;
mod process;

pub use guard::{ExecutionGuard, ExecutionToken};
pub use process::{ExecutionResult, ProcessRunner, RunRequest};
