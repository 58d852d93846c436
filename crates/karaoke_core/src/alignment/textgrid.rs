//! TextGrid interval-tier parser.
//!
//! Only the long text format emitted by the aligner is understood, and
//! only the fixed interval record shape:
//!
//! ```text
//! item [1]:
//!     class = "IntervalTier"
//!     name = "words"
//!     ...
//!     intervals [1]:
//!         xmin = 0.0
//!         xmax = 0.52
//!         text = "hello"
//! ```
//!
//! Records are matched by pattern rather than a full grammar.

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::ParseError;
use crate::models::Interval;

/// Name of the tier holding word-level intervals.
pub const WORDS_TIER: &str = "words";

static WORDS_TIER_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"item\s*\[\d+\]:\s*class\s*=\s*"IntervalTier"\s*name\s*=\s*"words""#)
        .expect("valid tier header regex")
});

static TIER_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"item\s*\[\d+\]:").expect("valid tier start regex"));

// Labels escape quotes by doubling them.
static INTERVAL_RECORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"intervals\s*\[\d+\]:\s*xmin\s*=\s*(\S+)\s+xmax\s*=\s*(\S+)\s+text\s*=\s*"((?:[^"]|"")*)""#,
    )
    .expect("valid interval regex")
});

/// Parse the `words` tier of a TextGrid into non-empty intervals.
///
/// Intervals are returned in document order; empty labels (silence)
/// are dropped.
pub fn parse_textgrid(content: &str) -> Result<Vec<Interval>, ParseError> {
    let header = WORDS_TIER_HEADER
        .find(content)
        .ok_or_else(|| ParseError::tier_not_found(WORDS_TIER))?;

    let tier = &content[header.end()..];
    let tier = match TIER_START.find(tier) {
        Some(next) => &tier[..next.start()],
        None => tier,
    };

    let mut intervals = Vec::new();
    for caps in INTERVAL_RECORD.captures_iter(tier) {
        let start = parse_time("xmin", &caps[1])?;
        let end = parse_time("xmax", &caps[2])?;
        let label = caps[3].replace("\"\"", "\"");

        if !label.is_empty() {
            intervals.push(Interval::new(start, end, label));
        }
    }

    Ok(intervals)
}

fn parse_time(field: &'static str, raw: &str) -> Result<f64, ParseError> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError::bad_number(field, raw)),
    }
}
