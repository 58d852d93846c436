//! Ordered execution of [`PipelineStep`]s.

use super::errors::{PipelineError, PipelineResult, StepResult};
use super::step::PipelineStep;
use super::types::{Context, SessionState};

/// Steps run front to back; the first error ends the run.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn PipelineStep>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, step: impl PipelineStep + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step against `state`.
    ///
    /// A step's start checkpoint is published before its input is
    /// checked and its done checkpoint only after its output is. A failed
    /// step therefore leaves the tracker at its start checkpoint, or at
    /// the previous step's done checkpoint.
    pub fn run(&self, ctx: &Context, state: &mut SessionState) -> PipelineResult<PipelineRunResult> {
        let mut steps_completed = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            run_step(step.as_ref(), ctx, state).map_err(|e| {
                ctx.logger.error(&format!("{} failed: {}", step.name(), e));
                PipelineError::step_failed(ctx.session_id(), step.name(), e)
            })?;
            steps_completed.push(step.name().to_string());
        }

        ctx.logger.done("All steps finished");
        Ok(PipelineRunResult { steps_completed })
    }
}

fn run_step(step: &dyn PipelineStep, ctx: &Context, state: &mut SessionState) -> StepResult<()> {
    let checkpoints = step.checkpoints();
    ctx.logger.stage(step.description());
    if let Some(percent) = checkpoints.on_start {
        ctx.report_progress(step.name(), percent, step.description());
    }

    step.validate_input(ctx, state)?;
    ctx.logger.debug(&format!("{}: input ok", step.name()));
    step.execute(ctx, state)?;
    step.validate_output(ctx, state)?;

    let message = format!("{} finished", step.description());
    ctx.logger.done(&message);
    if let Some(percent) = checkpoints.on_done {
        ctx.report_progress(step.name(), percent, &message);
    }
    Ok(())
}

/// What a successful run did.
#[derive(Debug, Clone)]
pub struct PipelineRunResult {
    pub steps_completed: Vec<String>,
}
