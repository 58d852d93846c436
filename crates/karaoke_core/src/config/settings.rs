//! Typed view of `karaoke.toml`.
//!
//! Every table and every field is optional in the file: each struct is
//! `#[serde(default)]`, so whatever is missing comes from its `Default`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;
use crate::models::LanguageProfile;
use crate::tools::{resolve_program, ToolInvocation};

use super::manager::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathSettings,
    pub logging: LoggingSettings,
    pub tools: ToolSettings,
    pub encoding: EncodingSettings,
    pub alignment: AlignmentSettings,
    pub languages: LanguageSettings,
}

impl Settings {
    /// Profile for `selector`, or for `languages.default` when it is blank.
    pub fn language_profile(&self, selector: &str) -> ConfigResult<LanguageProfile> {
        let wanted = match selector.trim() {
            "" => self.languages.default.as_str(),
            _ => selector,
        };

        match self.languages.profiles.iter().find(|p| p.matches(wanted)) {
            Some(profile) => Ok(profile.clone()),
            None => Err(ConfigError::UnknownLanguage(wanted.to_string())),
        }
    }

    /// Fail on the first tool program that can't be resolved, or on a
    /// missing pitch script.
    pub fn validate_tools(&self) -> ConfigResult<()> {
        let missing = |tool: &str, program: &str| ConfigError::ToolNotFound {
            tool: tool.to_string(),
            program: program.to_string(),
        };

        if let Some((name, command)) = self
            .tools
            .named()
            .into_iter()
            .find(|(_, command)| resolve_program(&command.program).is_none())
        {
            return Err(missing(name, &command.program));
        }

        if !PathBuf::from(&self.tools.pitch_script).is_file() {
            return Err(missing("pitch_script", &self.tools.pitch_script));
        }
        Ok(())
    }
}

/// `[paths]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Parent of each session's scratch directory.
    pub work_root: String,
    /// Parent of each session's results directory.
    pub results_root: String,
    pub logs_folder: String,
    /// Leave the scratch directory in place after a successful session.
    pub keep_work_files: bool,
}

impl PathSettings {
    /// Directories that must exist before a session starts.
    pub fn directories(&self) -> [PathBuf; 3] {
        [
            PathBuf::from(&self.work_root),
            PathBuf::from(&self.results_root),
            PathBuf::from(&self.logs_folder),
        ]
    }
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            work_root: ".work".into(),
            results_root: "final_result".into(),
            logs_folder: ".logs".into(),
            keep_work_files: true,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: LogLevel,
    /// Keep tool output out of the log file; it still reaches the tail.
    pub compact: bool,
    /// Tool output lines replayed when a stage fails.
    pub error_tail: u32,
    /// Percent granularity of progress lines in compact mode.
    pub progress_step: u32,
    pub log_commands: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            compact: true,
            error_tail: 20,
            progress_step: 10,
            log_commands: true,
        }
    }
}

/// How to launch one external program.
///
/// `args` go before the stage's own arguments, so a wrapper such as
/// `conda run -n demucs_env demucs` is written as program `conda` with
/// the rest in `args`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    pub fn invocation(&self) -> ToolInvocation {
        self.env.iter().fold(
            ToolInvocation::new(&self.program).args(&self.args),
            |invocation, (key, value)| invocation.env(key, value),
        )
    }
}

/// `[tools]`, one sub-table per program.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Script handed to `pitch_annotator`.
    pub pitch_script: String,
    pub separator: ToolCommand,
    pub resampler: ToolCommand,
    pub encoder: ToolCommand,
    pub aligner: ToolCommand,
    pub pitch_annotator: ToolCommand,
}

impl ToolSettings {
    /// Every command keyed by its field name.
    pub fn named(&self) -> [(&'static str, &ToolCommand); 5] {
        [
            ("separator", &self.separator),
            ("resampler", &self.resampler),
            ("encoder", &self.encoder),
            ("aligner", &self.aligner),
            ("pitch_annotator", &self.pitch_annotator),
        ]
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            pitch_script: "vocal_pitch_analyzer.py".into(),
            separator: ToolCommand::new("demucs"),
            resampler: ToolCommand::new("ffmpeg"),
            encoder: ToolCommand::new("wav2ogg"),
            aligner: ToolCommand::new("mfa"),
            pitch_annotator: ToolCommand::new("python"),
        }
    }
}

/// `[encoding]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingSettings {
    /// Separator model; also names its output subfolder.
    pub separation_model: String,
    pub sample_rate: u32,
    pub bitrate: String,
    pub mono: bool,
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self {
            separation_model: "htdemucs".into(),
            sample_rate: 48_000,
            bitrate: "48k".into(),
            mono: true,
        }
    }
}

/// `[alignment]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentSettings {
    pub beam: u32,
    pub retry_beam: u32,
    /// Pass `--clean` so stale aligner caches are dropped.
    pub clean: bool,
    /// Run `model download` for a dictionary or acoustic model that is absent.
    pub download_missing_models: bool,
}

impl Default for AlignmentSettings {
    fn default() -> Self {
        Self {
            beam: 100,
            retry_beam: 400,
            clean: true,
            download_missing_models: false,
        }
    }
}

/// `[languages]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageSettings {
    /// Selector used when a request names none.
    pub default: String,
    pub profiles: Vec<LanguageProfile>,
}

impl Default for LanguageSettings {
    fn default() -> Self {
        Self {
            default: "vi".into(),
            profiles: vec![LanguageProfile::vietnamese(), LanguageProfile::english()],
        }
    }
}

/// A top-level table of the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Tools,
    Encoding,
    Alignment,
    Languages,
}

impl ConfigSection {
    /// Order in which a full save writes the tables.
    pub const ALL: [ConfigSection; 6] = [
        ConfigSection::Paths,
        ConfigSection::Logging,
        ConfigSection::Tools,
        ConfigSection::Encoding,
        ConfigSection::Alignment,
        ConfigSection::Languages,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Tools => "tools",
            ConfigSection::Encoding => "encoding",
            ConfigSection::Alignment => "alignment",
            ConfigSection::Languages => "languages",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Working, results and log directories",
            ConfigSection::Logging => "Session log verbosity and format",
            ConfigSection::Tools => "External programs; args are prepended to every call",
            ConfigSection::Encoding => "Source separation and Ogg encoding",
            ConfigSection::Alignment => "Forced aligner parameters",
            ConfigSection::Languages => "Dictionaries and acoustic models per language",
        }
    }
}
