//! Resample step - converts both stems to the target sample rate.

use std::path::{Path, PathBuf};

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, SessionState, StemPair};

use super::require_output;

pub struct ResampleStep;

impl ResampleStep {
    pub fn new() -> Self {
        Self
    }

    /// `vocals.wav` at 48000 Hz becomes `vocals_48k.wav` beside it.
    fn output_path(input: &Path, sample_rate: u32) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        input.with_file_name(format!("{}_{}k.wav", stem, sample_rate / 1000))
    }
}

impl Default for ResampleStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ResampleStep {
    fn name(&self) -> &str {
        "resample-48k"
    }

    fn description(&self) -> &str {
        "Resample stems"
    }

    fn validate_input(&self, _ctx: &Context, state: &SessionState) -> StepResult<()> {
        let stems = state
            .separation
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("stems have not been separated"))?;
        for path in stems.paths() {
            if !path.is_file() {
                return Err(StepError::file_not_found(path));
            }
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut SessionState) -> StepResult<()> {
        let stems = state
            .separation
            .clone()
            .ok_or_else(|| StepError::invalid_input("stems have not been separated"))?;
        let rate = ctx.settings.encoding.sample_rate;

        let outputs = StemPair::new(
            Self::output_path(&stems.vocals, rate),
            Self::output_path(&stems.instrumental, rate),
        );
        for (input, output) in stems.paths().into_iter().zip(outputs.paths()) {
            let invocation = ctx
                .settings
                .tools
                .resampler
                .invocation()
                .args(["-y", "-i"])
                .path_arg(input)
                .args(["-ar", rate.to_string().as_str()])
                .path_arg(output);
            ctx.run_tool(&invocation)?;
        }

        state.resample = Some(outputs);
        Ok(())
    }

    fn validate_output(&self, ctx: &Context, state: &SessionState) -> StepResult<()> {
        let stems = state
            .resample
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("resample not recorded"))?;
        let tool = ctx.settings.tools.resampler.program.as_str();
        for path in stems.paths() {
            require_output(tool, path)?;
        }
        Ok(())
    }
}
