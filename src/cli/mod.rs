//! Command-line interface for ndims-extract
//!
//! ```text
//! ndims-extract [OPTIONS] <NDIMS> [ROOT]...
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

mod commands;
mod output;

pub use commands::extract::{ExtractArgs, OutputFormat};
pub use output::Output;

#[derive(Parser, Debug)]
#[command(
    name = "ndims-extract",
    version,
    about = "Specialize C sources for 2D or 3D by resolving NDIMS conditionals in place",
    long_about = "Rewrites every matching source under the configured roots so that only the \
                  branch of each `#if NDIMS == 2` / `#if NDIMS == 3` block for the requested \
                  dimensionality remains. Files left empty are deleted. If any file is \
                  malformed, nothing is modified."
)]
pub struct Cli {
    /// Run as if started in <DIR> instead of current working directory
    #[arg(short = 'C', long = "directory", value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Additional configuration file (toml, json or yaml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    #[command(flatten)]
    pub extract: ExtractArgs,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        // Change directory if specified
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)
                .with_context(|| format!("Failed to change directory to {}", dir.display()))?;
        }

        setup_logging(self.verbose, self.quiet);

        let output = Output::new(self.verbose > 0, self.quiet);
        commands::extract::execute(self.extract, self.config.as_deref(), &output)
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => tracing_subscriber::EnvFilter::new("warn"),
        1 => tracing_subscriber::EnvFilter::new("info,ignore=warn,globset=warn"),
        2 => tracing_subscriber::EnvFilter::new("debug,ignore=warn,globset=warn"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
