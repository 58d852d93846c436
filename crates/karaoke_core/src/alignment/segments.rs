//! Segment builder: binds transcript lines to aligned word intervals.
//!
//! The aligner emits one interval per transcript word, in transcript
//! order, so the n-th whitespace token of the whole transcript maps to
//! the n-th interval. Each line owns a contiguous half-open range of
//! global word indices.
//!
//! When alignment produced fewer intervals than transcript words, the
//! trailing lines are truncated or dropped. That is the designed
//! response to a transcript/audio mismatch, not an error.

use crate::models::{round_to, Interval, LyricsDocument, Segment, WordInfo};

/// Decimal places kept for all emitted times.
const TIME_PRECISION: i32 = 2;

/// Build a lyrics document from transcript lines and word intervals.
pub fn build_document(lines: &[String], intervals: &[Interval], language: &str) -> LyricsDocument {
    let mut segments = Vec::new();
    let mut word_index = 0usize;

    for line in lines {
        let words: Vec<&str> = line.split_whitespace().collect();
        let range_start = word_index;
        word_index += words.len();

        if words.is_empty() || range_start >= intervals.len() {
            continue;
        }

        // Inclusive end, clamped to the intervals that exist.
        let range_end = (range_start + words.len() - 1).min(intervals.len() - 1);

        let words = (range_start..=range_end)
            .map(|i| WordInfo {
                word: words[i - range_start].to_string(),
                start: round_to(intervals[i].start, TIME_PRECISION),
                end: round_to(intervals[i].end, TIME_PRECISION),
            })
            .collect();

        segments.push(Segment {
            start: round_to(intervals[range_start].start, TIME_PRECISION),
            end: round_to(intervals[range_end].end, TIME_PRECISION),
            text: line.clone(),
            words,
        });
    }

    LyricsDocument {
        text: lines.join(" "),
        segments,
        language: language.to_string(),
    }
}
