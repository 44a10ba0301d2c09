use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tabular_insight::analyser::logic::{Analyzer, load_raw_table, save_result};
use tabular_insight::config::{AnalysisConfig, load_config, save_config};

#[derive(Parser)]
#[command(
    name = "tabular-insight",
    version,
    about = "Profile extracted tables: types, statistics, quality, correlations, outliers, trends"
)]
pub struct Cli {
    /// Directory for rotating log files. Defaults to the platform data directory.
    #[arg(long, global = true, env = "TABULAR_INSIGHT_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyse a table and print or save the result as JSON
    Analyze {
        /// Input table (.csv, .tsv or .json)
        input: PathBuf,

        /// Path to a JSON analysis configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print compact JSON instead of pretty JSON
        #[arg(long)]
        compact: bool,
    },
    /// Write the default configuration to a file
    InitConfig {
        /// Destination path
        path: PathBuf,
    },
}

pub fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Analyze {
            input,
            config,
            output,
            compact,
        } => handle_analyze(&input, config.as_deref(), output.as_deref(), compact),
        Commands::InitConfig { path } => handle_init_config(&path),
    }
}

fn handle_analyze(
    input: &Path,
    config_path: Option<&Path>,
    output: Option<&Path>,
    compact: bool,
) -> Result<()> {
    let config = match config_path {
        Some(path) => load_config(path)?,
        None => AnalysisConfig::default(),
    };
    let analyzer = Analyzer::new(config).context("Invalid analysis configuration")?;

    let raw = load_raw_table(input)?;
    let result = analyzer
        .analyze(&raw)
        .with_context(|| format!("Failed to analyse {}", input.display()))?;

    match output {
        Some(path) => save_result(&result, path)?,
        None => {
            let json = if compact {
                serde_json::to_string(&result)?
            } else {
                result.to_json_pretty()?
            };
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("Failed to write result to stdout")?;
        }
    }
    Ok(())
}

fn handle_init_config(path: &Path) -> Result<()> {
    save_config(&AnalysisConfig::default(), path)?;
    tracing::info!("Wrote default configuration to {}", path.display());
    Ok(())
}
