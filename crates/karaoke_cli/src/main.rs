//! Karaoke CLI - run the karaoke pipeline from the command line

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use karaoke_core::logging::{init_tracing, LogLevel};

use crate::cli::{run_cli, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (non_blocking, _guard) = tracing_appender::non_blocking(std::io::stderr());
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    init_tracing(level, non_blocking);

    run_cli(cli)
}
