//! Karaoke Core - Backend logic for the karaoke generator
//!
//! This crate turns a vocal + instrumental mix and a line transcript into
//! karaoke assets: separated and re-encoded stems plus a word-timed lyrics
//! document. It has no UI or HTTP dependencies and can be driven by a
//! server, a CLI tool or tests.

pub mod alignment;
pub mod config;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod results;
pub mod tools;
pub mod workspace;

pub use config::{ConfigManager, Settings};
pub use models::{LyricsDocument, ProgressSnapshot, ProgressStatus, SessionRequest};
pub use orchestrator::{SessionOutcome, SessionRunner};
pub use progress::ProgressTracker;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
