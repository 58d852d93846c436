//! CLI argument definitions using clap.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

#[derive(Debug, Parser)]
#[command(name = "karaoke")]
#[command(about = "Turn a song and its lyrics into karaoke tracks")]
#[command(version)]
pub struct Cli {
    /// Config file (default: the user config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug-level console logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one karaoke session
    Run {
        /// Vocal + instrumental mix
        audio: PathBuf,

        /// Lyrics transcript, one line per lyric line
        transcript: PathBuf,

        /// Language code (default: the configured default)
        #[arg(short, long)]
        language: Option<String>,

        /// Session id (default: <unix-seconds>_<audio file stem>)
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Convert an aligner TextGrid and its transcript to lyrics JSON
    Convert {
        /// Aligner TextGrid
        textgrid: PathBuf,

        /// Transcript that was aligned
        transcript: PathBuf,

        /// Output JSON path (default: TextGrid path with .json extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Value of the document's language field
        #[arg(short, long, default_value = "vi")]
        language: String,
    },

    /// List configured language profiles
    Languages,

    /// Zip a session's results
    Archive {
        /// Session id
        session: String,

        /// Output zip path (default: <results_root>/<session>_karaoke.zip)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that every configured tool can be found
    Check,
}

/// Execute CLI command - separated for testing.
pub fn run_cli(cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    let config = cli.config;
    match cli.command {
        Commands::Run {
            audio,
            transcript,
            language,
            session,
        } => commands::run(config, audio, transcript, language, session),
        Commands::Convert {
            textgrid,
            transcript,
            output,
            language,
        } => commands::convert(textgrid, transcript, output, &language),
        Commands::Languages => commands::languages(config),
        Commands::Archive { session, output } => commands::archive(config, &session, output),
        Commands::Check => commands::check(config),
    }
}
