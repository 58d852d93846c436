//! Logging for karaoke sessions.
//!
//! Two layers:
//! - `tracing` for process-wide events (session start/end, progress JSON,
//!   warnings and errors mirrored from session logs)
//! - [`SessionLogger`] for the per-session log file: stage markers, tool
//!   command lines and a tail of tool output that is replayed on failure
//!
//! # Example
//!
//! ```no_run
//! use karaoke_core::logging::{LogConfig, SessionLogger};
//!
//! let logger = SessionLogger::new(
//!     "1700000000_song",
//!     ".logs",
//!     LogConfig::default(),
//!     None,
//! ).unwrap();
//!
//! logger.stage("Align transcript");
//! logger.command("mfa align ...");
//! logger.progress(60);
//! logger.done("Session complete");
//! ```

mod session_logger;
mod types;

pub use session_logger::{sanitize_filename, SessionLogger, SessionLoggerBuilder};
pub use types::{LogCallback, LogConfig, LogLevel, Marker};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Install the process-wide tracing subscriber.
///
/// `RUST_LOG` wins over `default_level`. Events go to `writer`, for
/// example a `tracing_appender::non_blocking` handle. A second call is
/// a no-op.
pub fn init_tracing<W>(default_level: LogLevel, writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(writer)
        .with_target(false)
        .try_init();
}

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.filter_directive()))
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
