//! Pipeline orchestrator for karaoke sessions.
//!
//! A session runs a fixed sequence of steps over one uploaded mix and
//! its transcript. Each step validates its inputs, runs external tools
//! through the context, and records its outputs in the session state.
//!
//! # Architecture
//!
//! ```text
//! SessionRunner
//!     └── Pipeline
//!         ├── Step: Separate  (10% / 20%)
//!         ├── Step: Resample
//!         ├── Step: Encode    (40%)
//!         ├── Step: Align     (50% / 60%)
//!         └── Step: Package   (100%)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use karaoke_core::orchestrator::SessionRunner;
//! use karaoke_core::progress::ProgressTracker;
//! use karaoke_core::tools::ProcessRunner;
//!
//! let tracker = Arc::new(ProgressTracker::new());
//! let runner = SessionRunner::new(settings, Arc::new(ProcessRunner::new()), tracker);
//! let outcome = runner.run(&request)?;
//! println!("Results in {}", outcome.results_dir.display());
//! ```

mod errors;
mod pipeline;
mod session;
mod step;
pub mod steps;
mod types;

#[cfg(test)]
mod test_support;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use session::{is_ready, SessionOutcome, SessionRunner};
pub use step::{Checkpoints, PipelineStep};
pub use steps::{AlignStep, EncodeStep, PackageStep, ResampleStep, SeparateStep};
pub use types::{AlignmentOutput, Context, PackageOutput, SessionState, StemPair};

/// Create the standard karaoke pipeline with all steps in order.
///
/// 1. Separate - split the mix into vocals and instrumental
/// 2. Resample - bring both stems to the target sample rate
/// 3. Encode - lossy-encode both stems
/// 4. Align - align the transcript and annotate pitch
/// 5. Package - move final artifacts to the results directory
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(SeparateStep::new())
        .with_step(ResampleStep::new())
        .with_step(EncodeStep::new())
        .with_step(AlignStep::new())
        .with_step(PackageStep::new())
}
