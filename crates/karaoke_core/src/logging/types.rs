//! Session log levels, configuration and line markers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::LoggingSettings;

/// Severity of a session log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.filter_directive())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// How a session logger filters and formats.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Lines below this level are dropped.
    pub level: LogLevel,
    /// Keep tool output only in the tail buffer instead of the log.
    pub compact: bool,
    /// In compact mode, log progress only when it crosses a multiple of this.
    pub progress_step: u32,
    /// Tool output lines kept for failure diagnosis.
    pub tail_lines: usize,
    /// Prefix lines with the local wall-clock time.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            compact: true,
            progress_step: 10,
            tail_lines: 20,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Everything down to debug, with tool output echoed.
    pub fn verbose() -> Self {
        Self {
            level: LogLevel::Debug,
            compact: false,
            tail_lines: 50,
            ..Self::default()
        }
    }

    /// Build from the `[logging]` config section.
    pub fn from_settings(settings: &LoggingSettings) -> Self {
        Self {
            level: settings.level,
            compact: settings.compact,
            progress_step: settings.progress_step.max(1),
            tail_lines: settings.error_tail as usize,
            timestamps: true,
        }
    }
}

/// Sink receiving every formatted line (a UI, an HTTP stream, a test).
pub type LogCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Marker put in front of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `$ mfa align ...`
    Command,
    /// `== Align transcript ==`
    Stage,
    /// `[ok] ...`
    Done,
    /// `[warn] ...`
    Warning,
    /// `[error] ...`
    Error,
    /// `[stderr] ...` for a tool's error stream
    Stderr,
    Plain,
}

impl Marker {
    pub fn apply(&self, message: &str) -> String {
        match self {
            Marker::Command => format!("$ {}", message),
            Marker::Stage => format!("== {} ==", message),
            Marker::Done => format!("[ok] {}", message),
            Marker::Warning => format!("[warn] {}", message),
            Marker::Error => format!("[error] {}", message),
            Marker::Stderr => format!("[stderr] {}", message),
            Marker::Plain => message.to_string(),
        }
    }
}
