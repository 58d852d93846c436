//! Subcommand implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use karaoke_core::alignment::convert_textgrid;
use karaoke_core::config::{ConfigManager, LoadOutcome, Settings};
use karaoke_core::models::SessionRequest;
use karaoke_core::orchestrator::SessionRunner;
use karaoke_core::progress::ProgressTracker;
use karaoke_core::results::{archive_name, archive_results};
use karaoke_core::tools::{resolve_program, ProcessRunner};
use karaoke_core::workspace::SessionWorkspace;

const CONFIG_FILE: &str = "karaoke.toml";

/// Config path from the flag, else the user config directory, else the
/// working directory.
fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| {
        ProjectDirs::from("", "", "karaoke")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
    })
}

fn load_settings(explicit: Option<PathBuf>) -> Result<Settings> {
    let path = config_path(explicit);
    let mut manager = ConfigManager::new(&path);
    let outcome = manager
        .load_or_create()
        .with_context(|| format!("failed to load config: {}", path.display()))?;
    if outcome != LoadOutcome::Loaded {
        tracing::info!(config = %path.display(), ?outcome, "wrote default config values");
    }
    manager
        .ensure_dirs_exist()
        .context("failed to create configured directories")?;

    tracing::debug!(config = %path.display(), "config loaded");
    Ok(manager.into_settings())
}

pub fn run(
    config: Option<PathBuf>,
    audio: PathBuf,
    transcript: PathBuf,
    language: Option<String>,
    session: Option<String>,
) -> Result<()> {
    let settings = load_settings(config)?;
    settings
        .validate_tools()
        .context("tool check failed (run `karaoke check` for details)")?;

    let session_id = session.unwrap_or_else(|| SessionRequest::generated_id(&audio));
    let request = SessionRequest::new(
        &session_id,
        audio,
        transcript,
        language.unwrap_or_default(),
    );

    let tracker = Arc::new(ProgressTracker::new());
    let runner = SessionRunner::new(settings, Arc::new(ProcessRunner::new()), Arc::clone(&tracker));

    let result = runner.run(&request);

    if let Some(snapshot) = tracker.get(&session_id) {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    let outcome = result?;
    tracing::info!(
        results = %outcome.results_dir.display(),
        log = %outcome.log_path.display(),
        "session complete"
    );
    Ok(())
}

pub fn convert(
    textgrid: PathBuf,
    transcript: PathBuf,
    output: Option<PathBuf>,
    language: &str,
) -> Result<()> {
    let output = output.unwrap_or_else(|| textgrid.with_extension("json"));

    let document = convert_textgrid(&textgrid, &transcript, &output, language)
        .with_context(|| format!("failed to convert {}", textgrid.display()))?;

    tracing::info!(
        segments = document.segments.len(),
        words = document.word_count(),
        output = %output.display(),
        "lyrics written"
    );
    Ok(())
}

pub fn languages(config: Option<PathBuf>) -> Result<()> {
    let settings = load_settings(config)?;
    let default = &settings.languages.default;

    for profile in &settings.languages.profiles {
        let marker = if profile.matches(default) { "*" } else { " " };
        println!(
            "{} {:<4} {:<12} dictionary={} acoustic={}",
            marker, profile.code, profile.label, profile.dictionary, profile.acoustic_model
        );
    }
    Ok(())
}

pub fn archive(config: Option<PathBuf>, session: &str, output: Option<PathBuf>) -> Result<()> {
    let settings = load_settings(config)?;
    let results_dir = SessionWorkspace::new(&settings.paths, session, session)
        .results_dir()
        .to_path_buf();
    let output = output
        .unwrap_or_else(|| Path::new(&settings.paths.results_root).join(archive_name(session)));

    let zip_path = archive_results(&results_dir, &output)
        .with_context(|| format!("failed to archive session '{}'", session))?;
    println!("{}", zip_path.display());
    Ok(())
}

pub fn check(config: Option<PathBuf>) -> Result<()> {
    let settings = load_settings(config)?;

    let mut missing = 0;
    for (name, command) in settings.tools.named() {
        match resolve_program(&command.program) {
            Some(path) => println!("ok       {:<16} {}", name, path.display()),
            None => {
                missing += 1;
                println!("missing  {:<16} {}", name, command.program);
            }
        }
    }

    let script = Path::new(&settings.tools.pitch_script);
    if script.is_file() {
        println!("ok       {:<16} {}", "pitch_script", script.display());
    } else {
        missing += 1;
        println!("missing  {:<16} {}", "pitch_script", script.display());
    }

    if missing > 0 {
        bail!("{} configured tool(s) not found", missing);
    }
    Ok(())
}
