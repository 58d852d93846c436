//! Language profiles for the forced aligner.

use serde::{Deserialize, Serialize};

/// Maps a language selector to the aligner's dictionary and acoustic model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageProfile {
    /// Selector code (e.g., "vi", "en").
    pub code: String,
    /// Human-readable label.
    #[serde(default)]
    pub label: String,
    /// Pronunciation dictionary name.
    pub dictionary: String,
    /// Acoustic model name.
    pub acoustic_model: String,
}

impl LanguageProfile {
    pub fn new(
        code: impl Into<String>,
        label: impl Into<String>,
        dictionary: impl Into<String>,
        acoustic_model: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            dictionary: dictionary.into(),
            acoustic_model: acoustic_model.into(),
        }
    }

    /// Vietnamese profile.
    pub fn vietnamese() -> Self {
        Self::new("vi", "Vietnamese", "vietnamese_mfa", "vietnamese_mfa")
    }

    /// US English profile.
    pub fn english() -> Self {
        Self::new("en", "English", "english_us_mfa", "english_mfa")
    }

    /// Check whether a selector refers to this profile (case-insensitive).
    pub fn matches(&self, selector: &str) -> bool {
        self.code.eq_ignore_ascii_case(selector.trim())
    }
}
