//! Package step - moves the final artifacts into the session's results dir.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::{Checkpoints, PipelineStep};
use crate::orchestrator::types::{Context, PackageOutput, SessionState};
use crate::workspace::relocate_file;

use super::require_output;

pub struct PackageStep;

impl PackageStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PackageStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for PackageStep {
    fn name(&self) -> &str {
        "package-results"
    }

    fn description(&self) -> &str {
        "Package final files"
    }

    fn checkpoints(&self) -> Checkpoints {
        Checkpoints::after(100)
    }

    fn validate_input(&self, _ctx: &Context, state: &SessionState) -> StepResult<()> {
        let tracks = state
            .encode
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("tracks have not been encoded"))?;
        let alignment = state
            .alignment
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("transcript has not been aligned"))?;

        for path in [
            tracks.vocals.as_path(),
            tracks.instrumental.as_path(),
            alignment.annotated_lyrics.as_path(),
        ] {
            if !path.is_file() {
                return Err(StepError::file_not_found(path));
            }
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut SessionState) -> StepResult<()> {
        let (tracks, alignment) = match (&state.encode, &state.alignment) {
            (Some(tracks), Some(alignment)) => (tracks.clone(), alignment.clone()),
            _ => return Err(StepError::invalid_input("nothing to package")),
        };

        let ws = &ctx.workspace;
        let output = PackageOutput {
            results_dir: ws.results_dir().to_path_buf(),
            vocal: ws.final_vocal(),
            instrumental: ws.final_instrumental(),
            lyrics: ws.final_lyrics(),
        };

        let moves = [
            (&tracks.vocals, &output.vocal, "moving vocal track"),
            (&tracks.instrumental, &output.instrumental, "moving instrumental track"),
            (&alignment.annotated_lyrics, &output.lyrics, "moving lyrics document"),
        ];
        for (src, dst, operation) in moves {
            relocate_file(src, dst).map_err(|e| StepError::io(operation, e))?;
            ctx.logger
                .info(&format!("{} -> {}", src.display(), dst.display()));
        }

        state.package = Some(output);
        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &SessionState) -> StepResult<()> {
        let output = state
            .package
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("package not recorded"))?;
        for path in [&output.vocal, &output.instrumental, &output.lyrics] {
            require_output("package", path)?;
        }
        Ok(())
    }
}
