//! Loading and saving the TOML config file.
//!
//! Saves go through a temp file and a rename so a crash never leaves a
//! half-written config. `update_section` rewrites one table in place
//! with `toml_edit`, leaving the rest of the file (comments included)
//! as the user left it.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::DocumentMut;

use super::settings::{ConfigSection, Settings};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config is not editable TOML: {0}")]
    Edit(#[from] toml_edit::TomlError),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Tool '{tool}' not found: {program}")]
    ToolNotFound { tool: String, program: String },

    #[error("Unknown language selector: '{0}'")]
    UnknownLanguage(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// What `load_or_create` found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file existed with every section.
    Loaded,
    /// The file existed but lacked sections; defaults were written back.
    Completed,
    /// No file existed; defaults were written.
    Created,
}

/// Owns the config file path and the settings read from it.
pub struct ConfigManager {
    path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    /// Manager for `path` holding default settings until loaded.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            settings: Settings::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// In-memory settings; persisted only by `save` or `update_section`.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Read the file. Fields absent from it take their defaults.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.path.exists() {
            return Err(ConfigError::NotFound(self.path.clone()));
        }
        self.settings = toml::from_str(&fs::read_to_string(&self.path)?)?;
        Ok(())
    }

    /// Read the file, writing defaults for it or its missing sections.
    pub fn load_or_create(&mut self) -> ConfigResult<LoadOutcome> {
        if !self.path.exists() {
            self.settings = Settings::default();
            self.save()?;
            return Ok(LoadOutcome::Created);
        }

        let content = fs::read_to_string(&self.path)?;
        let doc: DocumentMut = content.parse()?;
        self.settings = toml::from_str(&content)?;

        let complete = ConfigSection::ALL
            .iter()
            .all(|section| doc.contains_key(section.table_name()));
        if complete {
            return Ok(LoadOutcome::Loaded);
        }

        self.save()?;
        Ok(LoadOutcome::Completed)
    }

    /// Create the work, results and logs directories.
    pub fn ensure_dirs_exist(&self) -> ConfigResult<()> {
        for dir in self.settings.paths.directories() {
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    /// Write every section, each under a comment naming it.
    pub fn save(&self) -> ConfigResult<()> {
        let mut content = String::from(
            "# Karaoke Generator Configuration\n\
             # Sections may be edited by hand; unknown keys are ignored.\n\n",
        );
        for section in ConfigSection::ALL {
            content.push_str(&format!("# {}\n", section.description()));
            content.push_str(&self.section_toml(section)?);
            content.push('\n');
        }

        write_atomically(&self.path, &content)?;
        Ok(())
    }

    /// Persist one section, leaving the rest of the file on disk untouched.
    ///
    /// Other in-memory edits are not written.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        let mut doc = match fs::read_to_string(&self.path) {
            Ok(content) => content.parse::<DocumentMut>()?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => DocumentMut::new(),
            Err(e) => return Err(e.into()),
        };

        let table_name = section.table_name();
        let fresh: DocumentMut = self.section_toml(section)?.parse()?;
        if let Some(item) = fresh.get(table_name) {
            doc[table_name] = item.clone();
        }

        write_atomically(&self.path, &doc.to_string())?;
        Ok(())
    }

    /// One section rendered as a standalone TOML document.
    fn section_toml(&self, section: ConfigSection) -> ConfigResult<String> {
        let s = &self.settings;
        let value = match section {
            ConfigSection::Paths => toml::Value::try_from(&s.paths)?,
            ConfigSection::Logging => toml::Value::try_from(&s.logging)?,
            ConfigSection::Tools => toml::Value::try_from(&s.tools)?,
            ConfigSection::Encoding => toml::Value::try_from(&s.encoding)?,
            ConfigSection::Alignment => toml::Value::try_from(&s.alignment)?,
            ConfigSection::Languages => toml::Value::try_from(&s.languages)?,
        };

        let mut table = toml::Table::new();
        table.insert(section.table_name().to_string(), value);
        Ok(toml::to_string_pretty(&table)?)
    }
}

/// Write `content` to a sibling temp file, sync it, then rename over `path`.
fn write_atomically(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp = path.with_extension("toml.tmp");
    {
        let mut file = fs::File::create(&temp)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&temp, path)
}
