//! Tool runner trait and the process-spawning implementation.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::error::ToolError;
use super::invocation::{ToolInvocation, ToolOutput};

/// Runs external tools on behalf of pipeline steps.
///
/// Implementations block until the tool finishes. There is no timeout:
/// a hung tool hangs the calling session.
pub trait ToolRunner: Send + Sync {
    /// Run the invocation.
    ///
    /// Returns captured output on exit code 0, `ToolError` otherwise.
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError>;
}

/// Spawns real processes with `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).envs(&invocation.env);
        if let Some(ref dir) = invocation.working_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!("Running: {}", invocation.command_line());

        let output = cmd
            .output()
            .map_err(|e| ToolError::spawn(invocation.tool_name(), e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);

        if !output.status.success() {
            return Err(ToolError::non_zero_exit(
                invocation.tool_name(),
                exit_code,
                stderr,
            ));
        }

        Ok(ToolOutput {
            stdout,
            stderr,
            exit_code,
        })
    }
}

/// Resolve a configured program to an executable path.
///
/// Names containing a path separator are checked directly; bare names
/// are searched on `PATH`.
pub fn resolve_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|path| path.is_file())
}
