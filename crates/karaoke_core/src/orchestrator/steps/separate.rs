//! Separate step - splits the input mix into vocal and instrumental stems.
//!
//! The separator is run in two-stem mode and writes
//! `<out>/<model>/<audio stem>/{vocals,no_vocals}.wav`.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::{Checkpoints, PipelineStep};
use crate::orchestrator::types::{Context, SessionState, StemPair};

use super::require_output;

pub struct SeparateStep;

impl SeparateStep {
    pub fn new() -> Self {
        Self
    }

    fn expected_stems(&self, ctx: &Context) -> StemPair {
        let dir = ctx
            .workspace
            .stems_dir(&ctx.settings.encoding.separation_model);
        StemPair::new(dir.join("vocals.wav"), dir.join("no_vocals.wav"))
    }
}

impl Default for SeparateStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for SeparateStep {
    fn name(&self) -> &str {
        "separate-sources"
    }

    fn description(&self) -> &str {
        "Separate vocals"
    }

    fn checkpoints(&self) -> Checkpoints {
        Checkpoints::around(10, 20)
    }

    fn validate_input(&self, ctx: &Context, _state: &SessionState) -> StepResult<()> {
        if !ctx.request.audio_path.is_file() {
            return Err(StepError::file_not_found(&ctx.request.audio_path));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut SessionState) -> StepResult<()> {
        let out_dir = ctx.workspace.separation_dir();
        ctx.logger.info(&format!(
            "Separating {} into {}",
            ctx.request.audio_path.display(),
            out_dir.display()
        ));

        let invocation = ctx
            .settings
            .tools
            .separator
            .invocation()
            .arg("--two-stems=vocals")
            .args(["-n", ctx.settings.encoding.separation_model.as_str()])
            .arg(format!("--out={}", out_dir.display()))
            .path_arg(&ctx.request.audio_path);
        ctx.run_tool(&invocation)?;

        state.separation = Some(self.expected_stems(ctx));
        Ok(())
    }

    fn validate_output(&self, ctx: &Context, state: &SessionState) -> StepResult<()> {
        let stems = state
            .separation
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("separation not recorded"))?;
        let tool = ctx.settings.tools.separator.program.as_str();
        for path in stems.paths() {
            require_output(tool, path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::test_support::{fake_tools, TestSession};

    #[test]
    fn builds_two_stem_command() {
        let session = TestSession::new();
        let ctx = session.context();
        let mut state = SessionState::new(ctx.session_id());

        let step = SeparateStep::new();
        step.validate_input(&ctx, &state).unwrap();
        step.execute(&ctx, &mut state).unwrap();
        step.validate_output(&ctx, &state).unwrap();

        let calls = session.runner.calls_to("demucs");
        assert_eq!(calls.len(), 1);
        let args = &calls[0].args;
        assert_eq!(args[0], "--two-stems=vocals");
        assert_eq!(&args[1..3], ["-n", "htdemucs"]);
        assert!(args[3].starts_with("--out="));
        assert!(args[3].ends_with("separated"));
        assert!(args[4].ends_with("song.mp3"));

        let stems = state.separation.unwrap();
        assert!(stems.vocals.ends_with("separated/htdemucs/song/vocals.wav"));
        assert!(stems.instrumental.ends_with("separated/htdemucs/song/no_vocals.wav"));
    }

    #[test]
    fn missing_audio_is_rejected() {
        let session = TestSession::new();
        let mut ctx = session.context();
        ctx.request.audio_path = session.dir.path().join("absent.mp3");

        let err = SeparateStep::new()
            .validate_input(&ctx, &SessionState::default())
            .unwrap_err();
        assert!(matches!(err, StepError::FileNotFound { .. }));
    }

    #[test]
    fn tool_exit_zero_without_stems_fails_validation() {
        let session = TestSession::with_runner(
            fake_tools().on("demucs", |_| Ok(Default::default())),
        );
        let ctx = session.context();
        let mut state = SessionState::new(ctx.session_id());

        let step = SeparateStep::new();
        step.execute(&ctx, &mut state).unwrap();
        let err = step.validate_output(&ctx, &state).unwrap_err();
        assert!(matches!(err, StepError::MissingOutput { ref tool, .. } if tool == "demucs"));
    }
}
