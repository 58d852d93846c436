//! TextGrid + transcript → lyrics JSON file conversion.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use super::error::ConvertError;
use super::segments::build_document;
use super::textgrid::parse_textgrid;
use super::transcript::read_transcript;
use crate::models::LyricsDocument;

/// Convert an aligner TextGrid into a lyrics document and write it as JSON.
///
/// # Arguments
/// * `textgrid_path` - Aligner output for the vocal stem
/// * `transcript_path` - The line transcript that was aligned
/// * `output_path` - Where to write the JSON document (parents are created)
/// * `language` - Value of the document's `language` field
pub fn convert_textgrid(
    textgrid_path: &Path,
    transcript_path: &Path,
    output_path: &Path,
    language: &str,
) -> Result<LyricsDocument, ConvertError> {
    for input in [textgrid_path, transcript_path] {
        if !input.exists() {
            return Err(ConvertError::MissingInput(input.to_path_buf()));
        }
    }

    let content = fs::read_to_string(textgrid_path).map_err(|e| ConvertError::ReadError {
        path: textgrid_path.to_path_buf(),
        source: e,
    })?;

    let intervals = parse_textgrid(&content).map_err(|e| ConvertError::ParseError {
        path: textgrid_path.to_path_buf(),
        source: e,
    })?;

    let lines = read_transcript(transcript_path).map_err(|e| ConvertError::ReadError {
        path: transcript_path.to_path_buf(),
        source: e,
    })?;

    let document = build_document(&lines, &intervals, language);
    write_document(&document, output_path)?;

    tracing::info!(
        "Converted {} to {} ({} segments, {} intervals)",
        textgrid_path.display(),
        output_path.display(),
        document.segments.len(),
        intervals.len()
    );

    Ok(document)
}

/// Write a lyrics document as 4-space indented JSON.
pub fn write_document(document: &LyricsDocument, output_path: &Path) -> Result<(), ConvertError> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConvertError::WriteError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    document.serialize(&mut serializer)?;

    fs::write(output_path, buffer).map_err(|e| ConvertError::WriteError {
        path: output_path.to_path_buf(),
        source: e,
    })
}
