//! Per-session working directories.
//!
//! Every intermediate file of a session lives under
//! `<work_root>/<session>/`, and final artifacts under
//! `<results_root>/<session>/`, so concurrent sessions never share paths.
//!
//! ```text
//! <work_root>/<session>/
//!     separated/<model>/<audio stem>/   separator output (vocals.wav, no_vocals.wav)
//!     aligner_input/                    <audio stem>.wav + <audio stem>.lab
//!     aligner_output/                   <audio stem>.TextGrid, lyrics JSON
//! <results_root>/<session>/
//!     vocal_48k.ogg, no_vocals_48k.ogg, timestamp_with_notes.json
//! ```

mod relocate;

pub use relocate::{relocate_file, replace_copy};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::PathSettings;
use crate::logging::sanitize_filename;

/// Final vocal track name in the results directory.
pub const VOCAL_TRACK: &str = "vocal_48k.ogg";
/// Final instrumental track name in the results directory.
pub const INSTRUMENTAL_TRACK: &str = "no_vocals_48k.ogg";
/// Final lyrics document name in the results directory.
pub const LYRICS_DOCUMENT: &str = "timestamp_with_notes.json";

/// Directory layout for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionWorkspace {
    session_id: String,
    audio_stem: String,
    root: PathBuf,
    results_dir: PathBuf,
}

impl SessionWorkspace {
    /// Lay out the directories for a session. Nothing is created yet.
    pub fn new(paths: &PathSettings, session_id: &str, audio_stem: &str) -> Self {
        let dir_name = sanitize_filename(session_id);
        Self {
            session_id: session_id.to_string(),
            audio_stem: audio_stem.to_string(),
            root: PathBuf::from(&paths.work_root).join(&dir_name),
            results_dir: PathBuf::from(&paths.results_root).join(&dir_name),
        }
    }

    /// Create every directory the pipeline writes to.
    pub fn create(&self) -> io::Result<()> {
        for dir in [
            self.root.clone(),
            self.separation_dir(),
            self.aligner_input_dir(),
            self.aligner_output_dir(),
            self.results_dir.clone(),
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Remove the working directory (results are kept).
    pub fn cleanup(&self) -> io::Result<()> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root)?;
        }
        Ok(())
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// File stem of the audio input.
    pub fn audio_stem(&self) -> &str {
        &self.audio_stem
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Output directory handed to the separator.
    pub fn separation_dir(&self) -> PathBuf {
        self.root.join("separated")
    }

    /// Where the separator writes the stems for `model`.
    pub fn stems_dir(&self, model: &str) -> PathBuf {
        self.separation_dir().join(model).join(&self.audio_stem)
    }

    /// Input directory scanned by the aligner.
    pub fn aligner_input_dir(&self) -> PathBuf {
        self.root.join("aligner_input")
    }

    /// Output directory of the aligner.
    pub fn aligner_output_dir(&self) -> PathBuf {
        self.root.join("aligner_output")
    }

    /// Vocal audio as seen by the aligner.
    pub fn aligner_audio(&self) -> PathBuf {
        self.aligner_input_dir()
            .join(format!("{}.wav", self.audio_stem))
    }

    /// Transcript as seen by the aligner.
    pub fn aligner_transcript(&self) -> PathBuf {
        self.aligner_input_dir()
            .join(format!("{}.lab", self.audio_stem))
    }

    /// TextGrid written by the aligner.
    pub fn textgrid_path(&self) -> PathBuf {
        self.aligner_output_dir()
            .join(format!("{}.TextGrid", self.audio_stem))
    }

    /// Lyrics document built from the TextGrid.
    pub fn lyrics_path(&self) -> PathBuf {
        self.aligner_output_dir().join("output.json")
    }

    /// Lyrics document enriched by the pitch annotator.
    pub fn annotated_lyrics_path(&self) -> PathBuf {
        self.aligner_output_dir().join("output_with_notes.json")
    }

    /// Detailed log written by the pitch annotator.
    pub fn pitch_log_path(&self) -> PathBuf {
        self.aligner_output_dir().join("pitch_analysis_log.json")
    }

    /// Final results directory for this session.
    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    pub fn final_vocal(&self) -> PathBuf {
        self.results_dir.join(VOCAL_TRACK)
    }

    pub fn final_instrumental(&self) -> PathBuf {
        self.results_dir.join(INSTRUMENTAL_TRACK)
    }

    pub fn final_lyrics(&self) -> PathBuf {
        self.results_dir.join(LYRICS_DOCUMENT)
    }
}
