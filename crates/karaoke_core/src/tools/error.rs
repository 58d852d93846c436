//! Tool runner errors.

use std::io;

use thiserror::Error;

/// Failure of a single external tool invocation.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The process could not be started.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The process exited with a non-zero status.
    #[error("{program} failed with exit code {exit_code}: {stderr}")]
    NonZeroExit {
        program: String,
        exit_code: i32,
        stderr: String,
    },
}

impl ToolError {
    pub fn spawn(program: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    pub fn non_zero_exit(
        program: impl Into<String>,
        exit_code: i32,
        stderr: impl Into<String>,
    ) -> Self {
        Self::NonZeroExit {
            program: program.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Exit code, if the process ran at all.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ToolError::NonZeroExit { exit_code, .. } => Some(*exit_code),
            ToolError::Spawn { .. } => None,
        }
    }
}
