//! External tool invocation.
//!
//! Every pipeline stage that needs an external program (separator,
//! resampler, encoder, aligner, pitch annotator) builds a
//! [`ToolInvocation`] and hands it to a [`ToolRunner`]. The real runner
//! spawns a process and blocks until it exits. Tests substitute a fake
//! runner that returns canned results.
//!
//! No shell is involved: program and arguments are passed as-is.

mod error;
mod invocation;
mod runner;

#[cfg(test)]
pub(crate) mod testing;

pub use error::ToolError;
pub use invocation::{ToolInvocation, ToolOutput};
pub use runner::{resolve_program, ProcessRunner, ToolRunner};
