//! Session runner - sets up and runs one karaoke session end to end.
//!
//! Each session runs the standard pipeline on the calling thread
//! (`run`) or on a dedicated thread (`spawn`). Any failure is recorded
//! in the progress tracker as a `failed` snapshot before it is returned.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use serde::Serialize;

use crate::config::Settings;
use crate::logging::{LogConfig, SessionLogger};
use crate::models::SessionRequest;
use crate::progress::ProgressTracker;
use crate::tools::ToolRunner;
use crate::workspace::SessionWorkspace;

use super::create_standard_pipeline;
use super::errors::{PipelineError, PipelineResult, StepError};
use super::types::{Context, SessionState};

/// Where a finished session left its artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionOutcome {
    pub session_id: String,
    pub results_dir: PathBuf,
    pub vocal: PathBuf,
    pub instrumental: PathBuf,
    pub lyrics: PathBuf,
    pub log_path: PathBuf,
    pub steps_completed: Vec<String>,
}

/// Runs sessions against shared settings, tools and progress store.
#[derive(Clone)]
pub struct SessionRunner {
    settings: Settings,
    runner: Arc<dyn ToolRunner>,
    tracker: Arc<ProgressTracker>,
}

impl SessionRunner {
    pub fn new(
        settings: Settings,
        runner: Arc<dyn ToolRunner>,
        tracker: Arc<ProgressTracker>,
    ) -> Self {
        Self {
            settings,
            runner,
            tracker,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tracker(&self) -> &Arc<ProgressTracker> {
        &self.tracker
    }

    /// Run one session to completion on the calling thread.
    ///
    /// On error the session's snapshot is marked `failed` with the
    /// error message and the failing step, then the error is returned.
    pub fn run(&self, request: &SessionRequest) -> PipelineResult<SessionOutcome> {
        let session_id = request.session_id.as_str();
        tracing::info!("Starting session '{}'", session_id);

        match self.run_session(request) {
            Ok(outcome) => {
                tracing::info!(
                    "Session '{}' complete: {}",
                    session_id,
                    outcome.results_dir.display()
                );
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!("{}", e);
                self.tracker
                    .mark_failed(session_id, &e.to_string(), e.step_name());
                Err(e)
            }
        }
    }

    /// Run a session on its own thread.
    ///
    /// Progress is observable through the shared tracker while it runs.
    pub fn spawn(&self, request: SessionRequest) -> JoinHandle<PipelineResult<SessionOutcome>> {
        let runner = self.clone();
        thread::spawn(move || runner.run(&request))
    }

    fn run_session(&self, request: &SessionRequest) -> PipelineResult<SessionOutcome> {
        let session_id = request.session_id.as_str();
        let setup_failed = |message: String| PipelineError::setup_failed(session_id, message);

        self.tracker.update(session_id, 0.0, "Session started", "start");

        if session_id.trim().is_empty() {
            return Err(setup_failed("session id is empty".to_string()));
        }
        for (what, path) in [
            ("audio file", &request.audio_path),
            ("transcript", &request.transcript_path),
        ] {
            if !path.is_file() {
                return Err(setup_failed(format!("{} not found: {}", what, path.display())));
            }
        }

        let profile = self
            .settings
            .language_profile(&request.language)
            .map_err(|e| setup_failed(e.to_string()))?;

        let workspace =
            SessionWorkspace::new(&self.settings.paths, session_id, &request.audio_stem());
        workspace
            .create()
            .map_err(|e| setup_failed(format!("creating session directories: {}", e)))?;

        let logger = SessionLogger::new(
            session_id,
            &self.settings.paths.logs_folder,
            LogConfig::from_settings(&self.settings.logging),
            None,
        )
        .map_err(|e| setup_failed(format!("creating session log: {}", e)))?;
        let logger = Arc::new(logger);

        logger.info(&format!(
            "Session {}: audio={} transcript={} language={}",
            session_id,
            request.audio_path.display(),
            request.transcript_path.display(),
            profile.code
        ));

        let ctx = Context::new(
            request.clone(),
            profile,
            self.settings.clone(),
            workspace,
            Arc::clone(&logger),
            Arc::clone(&self.runner),
        )
        .with_progress(Arc::clone(&self.tracker));

        let mut state = SessionState::new(session_id);
        let result = create_standard_pipeline().run(&ctx, &mut state)?;

        let package = state.package.take().ok_or_else(|| {
            PipelineError::step_failed(
                session_id,
                "package-results",
                StepError::invalid_input("package not recorded"),
            )
        })?;

        if !self.settings.paths.keep_work_files {
            if let Err(e) = ctx.workspace.cleanup() {
                logger.warn(&format!("Could not remove working directory: {}", e));
            }
        }
        logger.flush();

        Ok(SessionOutcome {
            session_id: session_id.to_string(),
            results_dir: package.results_dir,
            vocal: package.vocal,
            instrumental: package.instrumental,
            lyrics: package.lyrics,
            log_path: logger.log_path().to_path_buf(),
            steps_completed: result.steps_completed,
        })
    }
}

/// Whether a session's results can be fetched.
///
/// Results are only served once the session reached `complete`;
/// anything else (unknown, running, failed) is not ready.
pub fn is_ready(tracker: &ProgressTracker, session_id: &str) -> bool {
    tracker.is_complete(session_id)
}
