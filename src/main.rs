use anyhow::Result;
use clap::Parser;

use ndims_extract::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
