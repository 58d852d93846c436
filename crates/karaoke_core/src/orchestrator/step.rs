//! The unit of work a [`Pipeline`](super::Pipeline) runs.

use super::errors::StepResult;
use super::types::{Context, SessionState};

/// Progress percentages a step publishes around its work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checkpoints {
    /// Published before `validate_input`.
    pub on_start: Option<u32>,
    /// Published once `validate_output` has passed.
    pub on_done: Option<u32>,
}

impl Checkpoints {
    pub const NONE: Checkpoints = Checkpoints {
        on_start: None,
        on_done: None,
    };

    pub const fn around(start: u32, done: u32) -> Self {
        Self {
            on_start: Some(start),
            on_done: Some(done),
        }
    }

    pub const fn after(done: u32) -> Self {
        Self {
            on_start: None,
            on_done: Some(done),
        }
    }
}

/// One stage of a session.
///
/// A step reads what earlier steps recorded in [`SessionState`], does its
/// work through the [`Context`] (tool runner, workspace paths, logger),
/// and records its own output for the steps after it. The pipeline calls
/// `validate_input`, `execute` and `validate_output` in that order and
/// stops at the first error.
///
/// ```ignore
/// struct Trim;
///
/// impl PipelineStep for Trim {
///     fn name(&self) -> &str { "trim-silence" }
///
///     fn validate_input(&self, _ctx: &Context, state: &SessionState) -> StepResult<()> {
///         state.resample.as_ref().map(|_| ()).ok_or_else(|| StepError::invalid_input("no stems"))
///     }
///
///     fn execute(&self, ctx: &Context, state: &mut SessionState) -> StepResult<()> {
///         ctx.run_tool(/* ... */)?;
///         Ok(())
///     }
///
///     fn validate_output(&self, _ctx: &Context, _state: &SessionState) -> StepResult<()> {
///         Ok(())
///     }
/// }
/// ```
pub trait PipelineStep: Send + Sync {
    /// Stable identifier, reported as `current_step` in progress snapshots.
    fn name(&self) -> &str;

    /// Check that earlier steps left what this one needs.
    fn validate_input(&self, ctx: &Context, state: &SessionState) -> StepResult<()>;

    fn execute(&self, ctx: &Context, state: &mut SessionState) -> StepResult<()>;

    /// Check that the recorded output files exist.
    fn validate_output(&self, ctx: &Context, state: &SessionState) -> StepResult<()>;

    fn checkpoints(&self) -> Checkpoints {
        Checkpoints::NONE
    }

    /// Text for log stage headers and progress messages.
    fn description(&self) -> &str {
        self.name()
    }
}
