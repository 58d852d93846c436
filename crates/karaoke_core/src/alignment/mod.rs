//! Forced-alignment output handling.
//!
//! Converts the aligner's TextGrid output plus the original line
//! transcript into a [`LyricsDocument`](crate::models::LyricsDocument).
//!
//! # Flow
//!
//! ```text
//! TextGrid ──parse_textgrid──► [Interval] ─┐
//!                                          ├─build_document──► LyricsDocument
//! transcript ──parse_transcript──► [line] ─┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use karaoke_core::alignment::convert_textgrid;
//!
//! let doc = convert_textgrid(
//!     "aligned/song.TextGrid".as_ref(),
//!     "input/song.lab".as_ref(),
//!     "aligned/output.json".as_ref(),
//!     "vi",
//! ).unwrap();
//! println!("{} segments", doc.segments.len());
//! ```

mod convert;
mod error;
mod segments;
mod textgrid;
mod transcript;

pub use convert::{convert_textgrid, write_document};
pub use error::{ConvertError, ParseError};
pub use segments::build_document;
pub use textgrid::{parse_textgrid, WORDS_TIER};
pub use transcript::{parse_transcript, read_transcript};
