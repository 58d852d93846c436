//! The `karaoke.toml` config file.
//!
//! [`Settings`] holds one struct per TOML table. [`ConfigManager`] reads
//! the file, fills in tables it lacks, and writes either the whole file
//! or a single table back.
//!
//! ```no_run
//! use karaoke_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new("karaoke.toml");
//! config.load_or_create().unwrap();
//! println!("results go to {}", config.settings().paths.results_root);
//!
//! config.settings_mut().alignment.beam = 200;
//! config.update_section(ConfigSection::Alignment).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult, LoadOutcome};
pub use settings::{
    AlignmentSettings, ConfigSection, EncodingSettings, LanguageSettings, LoggingSettings,
    PathSettings, Settings, ToolCommand, ToolSettings,
};
