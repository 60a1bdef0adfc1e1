//! `towt` command line: fit TOWT baselines for every account in a CSV file
//! and write per-row counterfactual predictions.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use towt::config::TowtConfig;
use towt::regression::BinScope;
use towt::spline::SplineMethod;
use towt::{io, pipeline};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "towt")]
#[command(about = "Fit time-of-week-and-temperature baselines and predict counterfactual usage", long_about = None)]
struct Cli {
    /// Input CSV with one row per account and interval
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV for the predictions
    #[arg(short, long)]
    output: PathBuf,

    /// TOML configuration file (column names, model options, seasons)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Temperature spline: static or dynamic
    #[arg(long)]
    spline: Option<SplineMethod>,

    /// Collapse rows to one per account and day
    #[arg(long)]
    daily: bool,

    /// Minimum baseline observations per temperature bin
    #[arg(long)]
    min_temp_count: Option<usize>,

    /// Rows used to select dynamic bins: season or account
    #[arg(long)]
    bin_scope: Option<BinScope>,
}

impl Cli {
    fn load_config(&self) -> Result<TowtConfig> {
        let mut config = match &self.config {
            Some(path) => TowtConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => TowtConfig::default(),
        };

        if let Some(spline) = self.spline {
            config.model.spline = spline;
        }
        if self.daily {
            config.model.daily = true;
        }
        if let Some(count) = self.min_temp_count {
            config.model.min_temp_count = count;
        }
        if let Some(scope) = self.bin_scope {
            config.model.bin_scope = scope;
        }
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    info!(input = %cli.input.display(), "reading observations");
    let input = io::read_records_from_path(&cli.input, &config)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    let report = pipeline::run_records(input.records, &config).context("Baseline fitting failed")?;

    for failure in &report.failures {
        warn!(
            account = %failure.account,
            season = %failure.season,
            error = %failure.error,
            "no baseline model"
        );
    }

    io::write_predictions_to_path(&cli.output, &report.rows, &input.schema, &config)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    info!(
        output = %cli.output.display(),
        accounts = report.accounts,
        models = report.fitted_models(),
        failures = report.failures.len(),
        dropped_rows = report.dropped,
        "predictions written"
    );
    Ok(())
}
