//! Line transcript reader.

use std::fs;
use std::io;
use std::path::Path;

/// Split transcript content into trimmed, non-blank lines.
pub fn parse_transcript(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a transcript file into lines.
pub fn read_transcript(path: &Path) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_transcript(&content))
}
