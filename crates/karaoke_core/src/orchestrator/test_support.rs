//! Session fixtures shared by orchestrator tests.
//!
//! `fake_tools` answers every stage the way the real tools do on disk,
//! so the standard pipeline runs end to end without them.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::config::Settings;
use crate::logging::{LogConfig, SessionLogger};
use crate::models::SessionRequest;
use crate::progress::ProgressTracker;
use crate::tools::testing::FakeRunner;
use crate::tools::{ToolInvocation, ToolOutput};
use crate::workspace::SessionWorkspace;

use super::types::Context;

pub const SESSION_ID: &str = "1700000000_song";

pub const TRANSCRIPT: &str = "xin chao ban\n\nhom nay troi dep\n";

/// Words tier matching `TRANSCRIPT` (with leading and inner silence).
pub const TEXTGRID: &str = r#"File type = "ooTextFile"
Object class = "TextGrid"

xmin = 0
xmax = 4.5
tiers? <exists>
size = 2
item []:
    item [1]:
        class = "IntervalTier"
        name = "words"
        xmin = 0
        xmax = 4.5
        intervals: size = 9
        intervals [1]:
            xmin = 0
            xmax = 0.3
            text = ""
        intervals [2]:
            xmin = 0.3
            xmax = 0.61
            text = "xin"
        intervals [3]:
            xmin = 0.61
            xmax = 0.95
            text = "chao"
        intervals [4]:
            xmin = 0.95
            xmax = 1.4
            text = "ban"
        intervals [5]:
            xmin = 1.4
            xmax = 2.0
            text = ""
        intervals [6]:
            xmin = 2.0
            xmax = 2.333
            text = "hom"
        intervals [7]:
            xmin = 2.333
            xmax = 2.7
            text = "nay"
        intervals [8]:
            xmin = 2.7
            xmax = 3.1
            text = "troi"
        intervals [9]:
            xmin = 3.1
            xmax = 3.556
            text = "dep"
    item [2]:
        class = "IntervalTier"
        name = "phones"
        xmin = 0
        xmax = 4.5
        intervals: size = 1
        intervals [1]:
            xmin = 0.3
            xmax = 0.4
            text = "x"
"#;

/// Temp-dir backed settings, inputs, tracker and fake tools.
pub struct TestSession {
    pub dir: TempDir,
    pub settings: Settings,
    pub request: SessionRequest,
    pub tracker: Arc<ProgressTracker>,
    pub runner: Arc<FakeRunner>,
}

impl TestSession {
    pub fn new() -> Self {
        Self::with_runner(fake_tools())
    }

    pub fn with_runner(runner: FakeRunner) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        let mut settings = Settings::default();
        settings.paths.work_root = path_string(&root.join("work"));
        settings.paths.results_root = path_string(&root.join("results"));
        settings.paths.logs_folder = path_string(&root.join("logs"));

        let script = root.join("vocal_pitch_analyzer.py");
        fs::write(&script, "# pitch analysis").unwrap();
        settings.tools.pitch_script = path_string(&script);

        let audio = root.join("song.mp3");
        let transcript = root.join("lyrics.txt");
        fs::write(&audio, "mix").unwrap();
        fs::write(&transcript, TRANSCRIPT).unwrap();

        Self {
            request: SessionRequest::new(SESSION_ID, audio, transcript, "vi"),
            settings,
            tracker: Arc::new(ProgressTracker::new()),
            runner: Arc::new(runner),
            dir,
        }
    }

    pub fn workspace(&self) -> SessionWorkspace {
        SessionWorkspace::new(
            &self.settings.paths,
            &self.request.session_id,
            &self.request.audio_stem(),
        )
    }

    /// Context over a created workspace, publishing to `tracker`.
    pub fn context(&self) -> Context {
        let workspace = self.workspace();
        workspace.create().unwrap();

        let logger = SessionLogger::new(
            &self.request.session_id,
            &self.settings.paths.logs_folder,
            LogConfig::default(),
            None,
        )
        .unwrap();

        let profile = self.settings.language_profile(&self.request.language).unwrap();

        Context::new(
            self.request.clone(),
            profile,
            self.settings.clone(),
            workspace,
            Arc::new(logger),
            self.runner.clone(),
        )
        .with_progress(Arc::clone(&self.tracker))
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

pub fn value_after<'a>(inv: &'a ToolInvocation, flag: &str) -> &'a str {
    let pos = inv
        .args
        .iter()
        .position(|a| a == flag)
        .unwrap_or_else(|| panic!("{} missing in {:?}", flag, inv.args));
    &inv.args[pos + 1]
}

pub fn touch(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Fake separator, resampler, encoder, aligner and pitch annotator.
pub fn fake_tools() -> FakeRunner {
    FakeRunner::new()
        .on("demucs", |inv| {
            let out = inv
                .args
                .iter()
                .find_map(|a| a.strip_prefix("--out="))
                .map(PathBuf::from)
                .unwrap();
            let model = value_after(inv, "-n");
            let input = PathBuf::from(inv.args.last().unwrap());
            let stems = out.join(model).join(input.file_stem().unwrap());
            touch(&stems.join("vocals.wav"), "vocals");
            touch(&stems.join("no_vocals.wav"), "instrumental");
            Ok(ToolOutput::default())
        })
        .on("ffmpeg", |inv| {
            touch(Path::new(inv.args.last().unwrap()), "resampled");
            Ok(ToolOutput::default())
        })
        .on("wav2ogg", |inv| {
            let input = PathBuf::from(value_after(inv, "-i"));
            let bitrate = value_after(inv, "-b");
            let name = format!(
                "{}_{}.ogg",
                input.file_stem().unwrap().to_string_lossy(),
                bitrate
            );
            touch(&input.with_file_name(name), "ogg");
            Ok(ToolOutput::default())
        })
        .on("mfa", |inv| match inv.args[0].as_str() {
            "model" if inv.args[1] == "list" => Ok(ToolOutput {
                stdout: "vietnamese_mfa\nenglish_us_mfa\nenglish_mfa\n".to_string(),
                ..ToolOutput::default()
            }),
            "align" => {
                let input = PathBuf::from(&inv.args[1]);
                let output = PathBuf::from(&inv.args[4]);
                let wav = fs::read_dir(&input)
                    .unwrap()
                    .filter_map(|e| e.ok().map(|e| e.path()))
                    .find(|p| p.extension().is_some_and(|x| x == "wav"))
                    .unwrap();
                let grid = output.join(format!(
                    "{}.TextGrid",
                    wav.file_stem().unwrap().to_string_lossy()
                ));
                touch(&grid, TEXTGRID);
                Ok(ToolOutput::default())
            }
            _ => Ok(ToolOutput::default()),
        })
        .on("python", |inv| {
            let lyrics = fs::read_to_string(&inv.args[1]).unwrap();
            touch(Path::new(value_after(inv, "--output")), &lyrics);
            touch(Path::new(value_after(inv, "--log")), "{}");
            Ok(ToolOutput::default())
        })
}
