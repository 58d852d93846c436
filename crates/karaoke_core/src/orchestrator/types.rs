//! Core types for the orchestrator pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::logging::SessionLogger;
use crate::models::{LanguageProfile, SessionRequest};
use crate::progress::ProgressTracker;
use crate::tools::{ToolError, ToolInvocation, ToolOutput, ToolRunner};
use crate::workspace::SessionWorkspace;

use super::errors::StepResult;

/// Read-only context passed to pipeline steps.
///
/// Contains the session request and shared resources that steps can read
/// but not modify. Mutable state goes in `SessionState`.
pub struct Context {
    /// What the caller asked for.
    pub request: SessionRequest,
    /// Resolved language profile for the aligner.
    pub profile: LanguageProfile,
    /// Application settings.
    pub settings: Settings,
    /// Session-scoped directories.
    pub workspace: SessionWorkspace,
    /// Per-session logger.
    pub logger: Arc<SessionLogger>,
    runner: Arc<dyn ToolRunner>,
    progress: Option<Arc<ProgressTracker>>,
}

impl Context {
    /// Create a new context for a session.
    pub fn new(
        request: SessionRequest,
        profile: LanguageProfile,
        settings: Settings,
        workspace: SessionWorkspace,
        logger: Arc<SessionLogger>,
        runner: Arc<dyn ToolRunner>,
    ) -> Self {
        Self {
            request,
            profile,
            settings,
            workspace,
            logger,
            runner,
            progress: None,
        }
    }

    /// Publish progress to this tracker.
    pub fn with_progress(mut self, tracker: Arc<ProgressTracker>) -> Self {
        self.progress = Some(tracker);
        self
    }

    pub fn session_id(&self) -> &str {
        &self.request.session_id
    }

    /// Publish a progress checkpoint.
    pub fn report_progress(&self, step_name: &str, percent: u32, message: &str) {
        self.logger.progress(percent);
        if let Some(ref tracker) = self.progress {
            tracker.update(self.session_id(), f64::from(percent), message, step_name);
        }
    }

    /// Run one external tool, logging its command line and output.
    ///
    /// On failure the captured stderr goes to the tail buffer and the
    /// tail is shown before the error is returned.
    pub fn run_tool(&self, invocation: &ToolInvocation) -> StepResult<ToolOutput> {
        if self.settings.logging.log_commands {
            self.logger.command(&invocation.command_line());
        }

        match self.runner.run(invocation) {
            Ok(output) => {
                self.logger.tool_output(&output.stdout, &output.stderr);
                Ok(output)
            }
            Err(e) => {
                if let ToolError::NonZeroExit { ref stderr, .. } = e {
                    self.logger.tool_output("", stderr);
                }
                self.logger.show_tail(&invocation.tool_name());
                Err(e.into())
            }
        }
    }
}

/// Mutable session state that accumulates results from pipeline steps.
///
/// Steps add their own section and read earlier ones; nothing is
/// overwritten once recorded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    /// When the session started.
    pub started_at: Option<String>,
    /// Raw stems from the separator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separation: Option<StemPair>,
    /// Stems resampled to the target rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resample: Option<StemPair>,
    /// Lossy encoded stems.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encode: Option<StemPair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<AlignmentOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageOutput>,
}

impl SessionState {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    pub fn is_packaged(&self) -> bool {
        self.package.is_some()
    }
}

/// Vocal and instrumental versions of one intermediate artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemPair {
    pub vocals: PathBuf,
    pub instrumental: PathBuf,
}

impl StemPair {
    pub fn new(vocals: impl Into<PathBuf>, instrumental: impl Into<PathBuf>) -> Self {
        Self {
            vocals: vocals.into(),
            instrumental: instrumental.into(),
        }
    }

    /// Both paths, vocals first.
    pub fn paths(&self) -> [&Path; 2] {
        [&self.vocals, &self.instrumental]
    }
}

/// Output from the alignment step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentOutput {
    /// Aligner TextGrid.
    pub textgrid: PathBuf,
    /// Lyrics document built from the TextGrid.
    pub lyrics: PathBuf,
    /// Lyrics document enriched with pitch notes.
    pub annotated_lyrics: PathBuf,
    /// Detailed log written by the pitch annotator.
    pub pitch_log: PathBuf,
    pub segment_count: usize,
    pub word_count: usize,
}

/// Final artifacts in the results directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageOutput {
    pub results_dir: PathBuf,
    pub vocal: PathBuf,
    pub instrumental: PathBuf,
    pub lyrics: PathBuf,
}
