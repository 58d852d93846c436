//! Alignment error types.

use std::path::PathBuf;

/// Errors that can occur while parsing aligner output.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The requested interval tier does not exist.
    #[error("Tier '{tier}' not found in TextGrid")]
    TierNotFound { tier: String },

    /// A numeric field could not be parsed.
    #[error("Invalid number for {field}: '{value}'")]
    BadNumber { field: &'static str, value: String },
}

impl ParseError {
    pub fn tier_not_found(tier: impl Into<String>) -> Self {
        Self::TierNotFound { tier: tier.into() }
    }

    pub fn bad_number(field: &'static str, value: impl Into<String>) -> Self {
        Self::BadNumber {
            field,
            value: value.into(),
        }
    }
}

/// Errors that can occur while converting a TextGrid file to lyrics JSON.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// An input file is missing.
    #[error("Input file does not exist: {0}")]
    MissingInput(PathBuf),

    /// Failed to read an input file.
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The TextGrid could not be parsed.
    #[error("Failed to parse '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// Failed to write the output document.
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize the document.
    #[error("Failed to serialize lyrics JSON: {0}")]
    SerializeError(#[from] serde_json::Error),
}
