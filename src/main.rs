//! # tabular-insight command line
//!
//! ```bash
//! tabular-insight analyze sales.csv
//! tabular-insight analyze report.json --config analysis.json --output result.json
//! tabular-insight init-config analysis.json
//! ```
//!
//! Results go to stdout (or `--output`); logs go to stderr and to rotating
//! files under the platform data directory (or `--log-dir`).

mod cli;

use anyhow::Result;
use clap::Parser as _;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    tabular_insight::logging::init(cli.log_dir.as_deref())?;
    cli::run_command(cli.command)
}
