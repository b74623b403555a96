// SPDX-License-Identifier: AGPL-3.0-or-later
//! Pangloss - pandoc filter for interlinear glosses
//!
//! Pandoc runs filters with the target format as the first argument and the
//! document as JSON on stdin:
//!
//! ```text
//! pandoc paper.md --filter pangloss -o paper.tex
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use pangloss_core::{BackendRegistry, ConfigSources, Filter, FilterError};
use std::io;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Exit codes for different scenarios
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const CONFIG_ERROR: u8 = 1;
    pub const IO_ERROR: u8 = 2;
}

#[derive(Debug, Parser)]
#[command(name = "pangloss", version, about = "Pandoc filter for interlinear glosses")]
struct Cli {
    /// Output format pandoc is writing (latex, beamer, html, html5)
    format: String,
}

fn main() -> ExitCode {
    // stdout carries the document
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("PANGLOSS_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS),
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let registry = BackendRegistry::with_defaults();
    let filter = Filter::new(&registry, ConfigSources::discover());

    filter
        .run(io::stdin().lock(), io::stdout().lock(), &cli.format)
        .with_context(|| format!("pangloss failed for output format '{}'", cli.format))?;
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<FilterError>() {
        Some(FilterError::Backend(_) | FilterError::Config(_)) => exit_codes::CONFIG_ERROR,
        _ => exit_codes::IO_ERROR,
    }
}
