//! Per-session log file.
//!
//! Every session writes `<logs_folder>/<session id>.log`. Lines also go
//! to an optional callback. Warnings and errors are mirrored to `tracing`
//! tagged with the session id so they reach the process log as well.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogCallback, LogConfig, LogLevel, Marker};

/// Bounded buffer of the most recent tool output lines.
struct TailBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl TailBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    fn snapshot(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

/// Logger for one karaoke session.
pub struct SessionLogger {
    session_id: String,
    log_path: PathBuf,
    config: LogConfig,
    file: Mutex<Option<BufWriter<File>>>,
    callback: Option<LogCallback>,
    tail: Mutex<TailBuffer>,
    last_progress: Mutex<Option<u32>>,
}

impl SessionLogger {
    /// Create the log file (truncating an earlier one for the same session).
    pub fn new(
        session_id: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        callback: Option<LogCallback>,
    ) -> io::Result<Self> {
        let session_id = session_id.into();
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(format!("{}.log", sanitize_filename(&session_id)));
        let file = File::create(&log_path)?;

        Ok(Self {
            session_id,
            log_path,
            file: Mutex::new(Some(BufWriter::new(file))),
            callback,
            tail: Mutex::new(TailBuffer::new(config.tail_lines)),
            last_progress: Mutex::new(None),
            config,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Write one line if `level` passes the configured threshold.
    pub fn log(&self, level: LogLevel, marker: Marker, message: &str) {
        if level < self.config.level {
            return;
        }
        self.write_line(&marker.apply(message));
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, Marker::Plain, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, Marker::Plain, message);
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(session = %self.session_id, "{}", message);
        self.log(LogLevel::Warn, Marker::Warning, message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!(session = %self.session_id, "{}", message);
        self.log(LogLevel::Error, Marker::Error, message);
    }

    /// Command line of a tool about to run.
    pub fn command(&self, command_line: &str) {
        self.log(LogLevel::Info, Marker::Command, command_line);
    }

    /// Header for a pipeline stage.
    pub fn stage(&self, description: &str) {
        self.log(LogLevel::Info, Marker::Stage, description);
    }

    pub fn done(&self, message: &str) {
        self.log(LogLevel::Info, Marker::Done, message);
    }

    /// Log a progress percentage.
    ///
    /// In compact mode a value is skipped unless it reaches a new
    /// multiple of `progress_step` or 100. Returns whether it was logged.
    pub fn progress(&self, percent: u32) -> bool {
        if self.config.compact {
            let step = self.config.progress_step.max(1);
            let mut last = self.last_progress.lock();
            let crossed = match *last {
                Some(previous) => percent / step > previous / step,
                None => true,
            };
            if !crossed && percent < 100 {
                return false;
            }
            *last = Some(percent);
        }

        self.log(LogLevel::Info, Marker::Plain, &format!("Progress: {}%", percent));
        true
    }

    /// Record a tool's captured output.
    ///
    /// Non-blank lines always enter the tail buffer. They are written to
    /// the log only when not compact.
    pub fn tool_output(&self, stdout: &str, stderr: &str) {
        let streams = [(stdout, Marker::Plain), (stderr, Marker::Stderr)];
        for (text, marker) in streams {
            for line in text.lines().filter(|l| !l.trim().is_empty()) {
                self.tail.lock().push(line.to_string());
                if !self.config.compact {
                    self.log(LogLevel::Info, marker, line);
                }
            }
        }
    }

    /// Replay the tail buffer under a `[<tool>/tail]` header.
    pub fn show_tail(&self, tool: &str) {
        let lines = self.tail();
        if lines.is_empty() {
            return;
        }
        self.write_line(&format!("[{}/tail]", tool));
        for line in &lines {
            self.write_line(line);
        }
    }

    /// Current tail buffer contents, oldest first.
    pub fn tail(&self) -> Vec<String> {
        self.tail.lock().snapshot()
    }

    pub fn flush(&self) {
        if let Some(writer) = self.file.lock().as_mut() {
            let _ = writer.flush();
        }
    }

    /// Flush and release the file handle. Later lines only reach the callback.
    pub fn close(&self) {
        if let Some(mut writer) = self.file.lock().take() {
            let _ = writer.flush();
        }
    }

    fn write_line(&self, line: &str) {
        let line = if self.config.timestamps {
            format!("[{}] {}", Local::now().format("%H:%M:%S"), line)
        } else {
            line.to_string()
        };

        if let Some(writer) = self.file.lock().as_mut() {
            let _ = writeln!(writer, "{}", line);
        }
        if let Some(callback) = &self.callback {
            callback(&line);
        }
    }
}

impl Drop for SessionLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Make a session id safe as a single path component.
///
/// Reserved and control characters, `%`, and whitespace at either end are
/// percent-encoded, so distinct ids always give distinct names. An id of
/// only dots is encoded whole; the empty id becomes `%`.
pub fn sanitize_filename(name: &str) -> String {
    if name.is_empty() {
        return "%".to_string();
    }
    let only_dots = name.chars().all(|c| c == '.');
    let chars: Vec<char> = name.chars().collect();
    let first = chars.iter().position(|c| !c.is_whitespace()).unwrap_or(chars.len());
    let last = chars.iter().rposition(|c| !c.is_whitespace()).unwrap_or(0);

    let mut out = String::with_capacity(name.len());
    for (i, &c) in chars.iter().enumerate() {
        let encode = only_dots
            || matches!(c, '%' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
            || c.is_control()
            || (c.is_whitespace() && (i < first || i > last));
        if encode {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", byte));
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Fluent construction of a [`SessionLogger`].
pub struct SessionLoggerBuilder {
    session_id: String,
    log_dir: PathBuf,
    config: LogConfig,
    callback: Option<LogCallback>,
}

impl SessionLoggerBuilder {
    pub fn new(session_id: impl Into<String>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            session_id: session_id.into(),
            log_dir: log_dir.into(),
            config: LogConfig::default(),
            callback: None,
        }
    }

    pub fn config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    pub fn compact(mut self, compact: bool) -> Self {
        self.config.compact = compact;
        self
    }

    pub fn timestamps(mut self, timestamps: bool) -> Self {
        self.config.timestamps = timestamps;
        self
    }

    pub fn tail_lines(mut self, lines: usize) -> Self {
        self.config.tail_lines = lines;
        self
    }

    pub fn callback(mut self, callback: LogCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn build(self) -> io::Result<SessionLogger> {
        SessionLogger::new(self.session_id, self.log_dir, self.config, self.callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn collected() -> (Arc<Mutex<Vec<String>>>, LogCallback) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let callback: LogCallback = Box::new(move |line: &str| sink.lock().push(line.to_string()));
        (lines, callback)
    }

    fn read_log(logger: &SessionLogger) -> String {
        logger.flush();
        fs::read_to_string(logger.log_path()).unwrap()
    }

    #[test]
    fn log_file_named_after_session() {
        let dir = tempdir().unwrap();
        let logger =
            SessionLogger::new("1700000000_song", dir.path(), LogConfig::default(), None).unwrap();

        assert!(logger.log_path().is_file());
        assert_eq!(logger.log_path(), dir.path().join("1700000000_song.log"));
    }

    #[test]
    fn stage_command_and_done_markers() {
        let dir = tempdir().unwrap();
        let logger = SessionLoggerBuilder::new("s1", dir.path())
            .timestamps(false)
            .build()
            .unwrap();

        logger.stage("Separate vocals");
        logger.command("demucs --two-stems=vocals song.mp3");
        logger.done("Separate vocals completed");

        assert_eq!(
            read_log(&logger).lines().collect::<Vec<_>>(),
            vec![
                "== Separate vocals ==",
                "$ demucs --two-stems=vocals song.mp3",
                "[ok] Separate vocals completed",
            ]
        );
    }

    #[test]
    fn callback_sees_lines_above_threshold() {
        let dir = tempdir().unwrap();
        let (lines, callback) = collected();
        let logger = SessionLoggerBuilder::new("s1", dir.path())
            .level(LogLevel::Info)
            .timestamps(false)
            .callback(callback)
            .build()
            .unwrap();

        logger.debug("hidden");
        logger.info("shown");
        logger.warn("model missing");

        assert_eq!(*lines.lock(), vec!["shown", "[warn] model missing"]);
    }

    #[test]
    fn compact_progress_only_on_new_steps() {
        let dir = tempdir().unwrap();
        let config = LogConfig {
            progress_step: 20,
            ..LogConfig::default()
        };
        let logger = SessionLogger::new("s1", dir.path(), config, None).unwrap();

        assert!(logger.progress(10));
        assert!(!logger.progress(15));
        assert!(logger.progress(20));
        assert!(!logger.progress(25));
        assert!(logger.progress(40));
        assert!(logger.progress(100));
    }

    #[test]
    fn verbose_logs_every_progress_value() {
        let dir = tempdir().unwrap();
        let logger = SessionLogger::new("s1", dir.path(), LogConfig::verbose(), None).unwrap();

        assert!(logger.progress(50));
        assert!(logger.progress(50));
    }

    #[test]
    fn compact_keeps_tool_output_in_tail_only() {
        let dir = tempdir().unwrap();
        let logger = SessionLoggerBuilder::new("s1", dir.path())
            .compact(true)
            .tail_lines(3)
            .timestamps(false)
            .build()
            .unwrap();

        logger.tool_output("line 1\nline 2\n\nline 3", "warn 1\nwarn 2");

        assert_eq!(logger.tail(), vec!["line 3", "warn 1", "warn 2"]);
        assert!(read_log(&logger).is_empty());

        logger.show_tail("mfa");
        let content = read_log(&logger);
        assert!(content.starts_with("[mfa/tail]\n"));
        assert!(content.ends_with("warn 2\n"));
    }

    #[test]
    fn verbose_echoes_stderr_with_marker() {
        let dir = tempdir().unwrap();
        let config = LogConfig {
            timestamps: false,
            ..LogConfig::verbose()
        };
        let logger = SessionLogger::new("s1", dir.path(), config, None).unwrap();

        logger.tool_output("", "model missing");

        assert_eq!(read_log(&logger).trim(), "[stderr] model missing");
    }

    #[test]
    fn zero_tail_keeps_nothing() {
        let dir = tempdir().unwrap();
        let logger = SessionLoggerBuilder::new("s1", dir.path())
            .tail_lines(0)
            .build()
            .unwrap();

        logger.tool_output("a\nb", "");
        assert!(logger.tail().is_empty());
    }

    #[test]
    fn closed_logger_still_feeds_callback() {
        let dir = tempdir().unwrap();
        let (lines, callback) = collected();
        let logger = SessionLoggerBuilder::new("s1", dir.path())
            .timestamps(false)
            .callback(callback)
            .build()
            .unwrap();

        logger.close();
        logger.info("after close");

        assert!(fs::read_to_string(logger.log_path()).unwrap().is_empty());
        assert_eq!(*lines.lock(), vec!["after close"]);
    }

    #[test]
    fn sanitizes_filename() {
        assert_eq!(sanitize_filename("1700000000_my song"), "1700000000_my song");
        assert_eq!(sanitize_filename("has/slash"), "has%2Fslash");
        assert_eq!(sanitize_filename("a<b>c:d"), "a%3Cb%3Ec%3Ad");
        assert_eq!(sanitize_filename(".."), "%2E%2E");
        assert_eq!(sanitize_filename(" x "), "%20x%20");
        assert_eq!(sanitize_filename("  "), "%20%20");
        assert_eq!(sanitize_filename(""), "%");
    }

    #[test]
    fn distinct_ids_never_share_a_file_name() {
        let ids = ["a/b", "a_b", "a%2Fb", " x ", "x", "", ".", "..", "_", "%", "a\\b", "a:b"];
        let names: std::collections::HashSet<String> =
            ids.iter().map(|id| sanitize_filename(id)).collect();
        assert_eq!(names.len(), ids.len());
        assert!(names.iter().all(|n| !n.contains('/') && n != "." && n != ".."));
    }
}
