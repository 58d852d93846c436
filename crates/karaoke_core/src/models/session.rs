//! Session request handed to the runner by the boundary layer.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Everything needed to start one karaoke session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRequest {
    /// Session identifier (also keys progress and working directories).
    pub session_id: String,
    /// Vocal + instrumental mix.
    pub audio_path: PathBuf,
    /// Line transcript (one lyric line per text line).
    pub transcript_path: PathBuf,
    /// Language selector resolved against the configured profiles.
    pub language: String,
}

impl SessionRequest {
    pub fn new(
        session_id: impl Into<String>,
        audio_path: impl Into<PathBuf>,
        transcript_path: impl Into<PathBuf>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            audio_path: audio_path.into(),
            transcript_path: transcript_path.into(),
            language: language.into(),
        }
    }

    /// Generate a session ID of the form `<unix-seconds>_<audio file stem>`.
    pub fn generated_id(audio_path: &Path) -> String {
        let stem = audio_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "session".to_string());
        format!("{}_{}", chrono::Utc::now().timestamp(), stem)
    }

    /// File stem of the audio input, used to name per-session artifacts.
    pub fn audio_stem(&self) -> String {
        self.audio_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.session_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_ends_with_stem() {
        let id = SessionRequest::generated_id(Path::new("/uploads/my song.mp3"));
        assert!(id.ends_with("_my song"));
        let prefix = id.split('_').next().unwrap();
        assert!(prefix.parse::<i64>().is_ok());
    }

    #[test]
    fn audio_stem_strips_extension() {
        let request = SessionRequest::new("s1", "/in/track.wav", "/in/track.lab", "vi");
        assert_eq!(request.audio_stem(), "track");
    }
}
