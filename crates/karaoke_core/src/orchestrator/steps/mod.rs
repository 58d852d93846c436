//! Pipeline step implementations.
//!
//! Each step handles one stage of the karaoke pipeline.

mod align;
mod encode;
mod package;
mod resample;
mod separate;

pub use align::AlignStep;
pub use encode::EncodeStep;
pub use package::PackageStep;
pub use resample::ResampleStep;
pub use separate::SeparateStep;

use std::path::Path;

use super::errors::{StepError, StepResult};

/// Check that a tool left a non-empty file at `path`.
fn require_output(tool: &str, path: &Path) -> StepResult<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
        _ => Err(StepError::missing_output(tool_name(tool), path)),
    }
}

/// File name of a configured program (`/opt/bin/mfa` -> `mfa`).
fn tool_name(program: &str) -> String {
    Path::new(program)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.to_string())
}
