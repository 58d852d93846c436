//! Session and step failures.
//!
//! A [`StepError`] says what went wrong inside one step. The pipeline
//! wraps it in [`PipelineError::StepFailed`] with the session id and the
//! step name, which is what ends up in the failed progress snapshot.

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::alignment::ConvertError;
use crate::tools::ToolError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("session '{session_id}' failed in {step_name}: {source}")]
    StepFailed {
        session_id: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// Inputs, language or directories were unusable before any step ran.
    #[error("session '{session_id}' could not start: {message}")]
    SetupFailed { session_id: String, message: String },
}

impl PipelineError {
    pub fn step_failed(
        session_id: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            session_id: session_id.into(),
            step_name: step_name.into(),
            source,
        }
    }

    pub fn setup_failed(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            session_id: session_id.into(),
            message: message.into(),
        }
    }

    /// Step to report as `current_step`; `"setup"` before the pipeline ran.
    pub fn step_name(&self) -> &str {
        match self {
            Self::StepFailed { step_name, .. } => step_name,
            Self::SetupFailed { .. } => "setup",
        }
    }
}

#[derive(Error, Debug)]
pub enum StepError {
    /// An earlier step did not record what this one needs.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Missing model assets or a misconfigured tool.
    #[error("configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Tool(#[from] ToolError),

    /// The tool exited 0 without writing its documented output.
    #[error("{tool} exited cleanly but wrote no {path}")]
    MissingOutput { tool: String, path: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("file not found: {path}")]
    FileNotFound { path: String },

    #[error(transparent)]
    Convert(#[from] ConvertError),
}

impl StepError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn missing_output(tool: impl Into<String>, path: &Path) -> Self {
        Self::MissingOutput {
            tool: tool.into(),
            path: path.display().to_string(),
        }
    }

    /// I/O failure, prefixed with what was being attempted.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn file_not_found(path: &Path) -> Self {
        Self::FileNotFound {
            path: path.display().to_string(),
        }
    }
}

pub type StepResult<T> = Result<T, StepError>;

pub type PipelineResult<T> = Result<T, PipelineError>;
