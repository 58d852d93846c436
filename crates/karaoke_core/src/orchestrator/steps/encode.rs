//! Encode step - transcodes the resampled stems to Ogg.
//!
//! The encoder writes `<stem>_<bitrate>.ogg` beside its input, so
//! `vocals_48k.wav` at 48k becomes `vocals_48k_48k.ogg`.

use std::path::{Path, PathBuf};

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::{Checkpoints, PipelineStep};
use crate::orchestrator::types::{Context, SessionState, StemPair};

use super::require_output;

pub struct EncodeStep;

impl EncodeStep {
    pub fn new() -> Self {
        Self
    }

    fn output_path(input: &Path, bitrate: &str) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        input.with_file_name(format!("{}_{}.ogg", stem, bitrate))
    }
}

impl Default for EncodeStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for EncodeStep {
    fn name(&self) -> &str {
        "encode-lossy"
    }

    fn description(&self) -> &str {
        "Encode Ogg tracks"
    }

    fn checkpoints(&self) -> Checkpoints {
        Checkpoints::after(40)
    }

    fn validate_input(&self, _ctx: &Context, state: &SessionState) -> StepResult<()> {
        let stems = state
            .resample
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("stems have not been resampled"))?;
        for path in stems.paths() {
            if !path.is_file() {
                return Err(StepError::file_not_found(path));
            }
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut SessionState) -> StepResult<()> {
        let stems = state
            .resample
            .clone()
            .ok_or_else(|| StepError::invalid_input("stems have not been resampled"))?;
        let encoding = &ctx.settings.encoding;

        for input in stems.paths() {
            let mut invocation = ctx
                .settings
                .tools
                .encoder
                .invocation()
                .arg("-i")
                .path_arg(input)
                .args(["-b", encoding.bitrate.as_str()]);
            if encoding.mono {
                invocation = invocation.arg("-m");
            }
            ctx.run_tool(&invocation)?;
        }

        state.encode = Some(StemPair::new(
            Self::output_path(&stems.vocals, &encoding.bitrate),
            Self::output_path(&stems.instrumental, &encoding.bitrate),
        ));
        Ok(())
    }

    fn validate_output(&self, ctx: &Context, state: &SessionState) -> StepResult<()> {
        let tracks = state
            .encode
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("encode not recorded"))?;
        let tool = ctx.settings.tools.encoder.program.as_str();
        for path in tracks.paths() {
            require_output(tool, path)?;
        }
        Ok(())
    }
}
