//! Data models for the karaoke generator.
//!
//! This module contains the core data structures shared across the crate:
//! - Timed lyrics (intervals, words, segments, the final document)
//! - Language profiles used to parameterize alignment
//! - Progress snapshots published per session
//! - Session requests handed to the runner

mod language;
mod lyrics;
mod progress;
mod session;

pub use language::LanguageProfile;
pub use lyrics::{round_to, Interval, LyricsDocument, Segment, WordInfo};
pub use progress::{estimate_time_left, ProgressSnapshot, ProgressStatus, PROCESS_UPDATE};
pub use session::SessionRequest;
