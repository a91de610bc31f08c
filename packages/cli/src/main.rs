#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the locum map pipeline.
//!
//! Loads the CSV exports from `--data-dir`, runs the requested part of the
//! pipeline and prints the chart-ready tables to stdout as JSON (for a
//! rendering layer) or as a text summary.
//!
//! Uses `indicatif-log-bridge` (via [`locum_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and loading spinners never fight for the terminal.

mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use locum_map_analytics::config::{ConfigError, load_config, to_toml};
use locum_map_analytics::radius::radius_charts;
use locum_map_analytics::{location_summary, run_pipeline};
use locum_map_analytics_models::PipelineConfig;
use locum_map_cli_utils::{IndicatifProgress, MultiProgress};
use locum_map_records::paths::DataFiles;
use locum_map_records::progress::ProgressCallback;
use locum_map_records::{load_dataset, load_radius, load_shifts, load_users};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "locum_map_cli",
    about = "Geo-filtered aggregation of user, shift and travel radius exports"
)]
struct Cli {
    /// Directory holding the CSV exports
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Pipeline config TOML; built-in defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Human-readable summary
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// User and shift counts per location inside the bounding box
    Locations,
    /// Travel radius bands, histograms and scatter points
    Radius,
    /// Every table, plus application counts
    Report,
    /// Write the default config as TOML
    InitConfig {
        /// File to write; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let multi = locum_map_cli_utils::init_logger();

    let files = DataFiles::in_dir(&cli.data_dir);
    let progress_for = |label: &str| spinner(&multi, label);

    match cli.command {
        Commands::Locations => {
            let config = pipeline_config(cli.config.as_deref())?;
            let users = load_users(&files.users, progress_for("users").as_ref())?;
            let shifts = load_shifts(&files.shifts, progress_for("shifts").as_ref())?;
            let summary = location_summary(&users, &shifts, &config.bounding_box);
            emit(&summary, cli.format, output::locations_text)?;
        }
        Commands::Radius => {
            let config = pipeline_config(cli.config.as_deref())?;
            let radius = load_radius(&files.radius, progress_for("shifts in radius").as_ref())?;
            let charts = radius_charts(&radius, &config)?;
            emit(&charts, cli.format, output::radius_text)?;
        }
        Commands::Report => {
            let config = pipeline_config(cli.config.as_deref())?;
            let dataset = load_dataset(&files, progress_for)?;
            let report = run_pipeline(&dataset, &config)?;
            emit(&report, cli.format, output::report_text)?;
        }
        Commands::InitConfig { output } => init_config(output.as_deref())?,
    }

    Ok(())
}

fn pipeline_config(path: Option<&Path>) -> Result<PipelineConfig, ConfigError> {
    path.map_or_else(|| Ok(PipelineConfig::default()), load_config)
}

fn spinner(multi: &MultiProgress, label: &str) -> Arc<dyn ProgressCallback> {
    IndicatifProgress::rows_spinner(multi, label)
}

fn init_config(output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let toml_str = to_toml(&PipelineConfig::default())?;

    match output {
        Some(path) => {
            std::fs::write(path, toml_str)?;
            log::info!("Wrote default config to {}", path.display());
        }
        None => print!("{toml_str}"),
    }

    Ok(())
}

fn emit<T: Serialize>(
    value: &T,
    format: OutputFormat,
    text: fn(&T) -> String,
) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => print!("{}", text(value)),
    }
    Ok(())
}
