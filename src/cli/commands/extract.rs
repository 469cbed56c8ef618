use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use crate::cli::Output;
use crate::config::{ConfigOverrides, ExtractConfig};
use crate::filter::Dimensionality;
use crate::scanner::{Outcome, PlanningFailed, RunReport, Specializer};

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Target dimensionality (2 or 3)
    #[arg(value_name = "NDIMS")]
    pub ndims: Dimensionality,

    /// Directories to process instead of the configured roots
    #[arg(value_name = "ROOT")]
    pub roots: Vec<PathBuf>,

    /// Macro that selects the dimensionality in sources
    #[arg(long, value_name = "NAME")]
    pub selector: Option<String>,

    /// File-name patterns to process (comma-separated)
    #[arg(long, value_name = "GLOB", value_delimiter = ',')]
    pub include: Vec<String>,

    /// Show what would change without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Summary format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON report on stdout
    Json,
}

pub fn execute(args: ExtractArgs, config_path: Option<&Path>, output: &Output) -> Result<()> {
    let overrides = ConfigOverrides {
        selector: args.selector,
        roots: args.roots,
        include: args.include,
    };
    let config = ExtractConfig::load(config_path, &overrides)?;
    let specializer = Specializer::from_config(&config)?;

    let files = specializer.collect()?;
    let text = args.format == OutputFormat::Text;
    if text {
        output.verbose(&format!(
            "{} source file(s) under {}",
            files.len(),
            config
                .roots
                .iter()
                .map(|root| root.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));
        if files.is_empty() {
            output.warning("No source files found");
        }
    }

    let pb = if text {
        output.progress_bar(files.len() as u64, "planning")
    } else {
        indicatif::ProgressBar::hidden()
    };
    let progress = |done: usize, _total: usize| pb.set_position(done as u64);
    let result = specializer.specialize(files, args.ndims, args.dry_run, Some(progress));
    pb.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(err) => {
            if let Some(failed) = err.downcast_ref::<PlanningFailed>() {
                for failure in &failed.failures {
                    output.failure(&failure.to_string());
                }
            }
            return Err(err);
        }
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_summary(&report, output),
    }
    Ok(())
}

fn print_summary(report: &RunReport, output: &Output) {
    if report.dry_run {
        output.header(&format!("Dry run for {}D", report.ndims));
    } else {
        output.header(&format!("Specialized for {}D", report.ndims));
    }

    for change in &report.changes {
        let label = match (change.outcome, report.dry_run) {
            (Outcome::Rewritten, false) => "rewrote",
            (Outcome::Rewritten, true) => "rewrite",
            (Outcome::Deleted, false) => "deleted",
            (Outcome::Deleted, true) => "delete",
            (Outcome::Unchanged, _) => continue,
        };
        output.change(label, &change.path.display().to_string(), change.lines_before, change.lines_after);
    }

    output.key_value("Files examined:", &report.files_examined.to_string(), false);
    output.key_value("Rewritten:", &report.rewritten.to_string(), report.rewritten > 0);
    output.key_value("Deleted:", &report.deleted.to_string(), report.deleted > 0);
    output.key_value("Unchanged:", &report.unchanged.to_string(), false);
    output.key_value("Duration:", &format!("{}ms", report.duration_ms), false);

    if report.dry_run {
        output.info("Dry run, no files were modified");
    } else {
        output.success(&format!(
            "{} file(s) specialized for {}D",
            report.rewritten + report.deleted,
            report.ndims
        ));
    }
}
