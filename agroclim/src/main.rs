//! Climate data validation tool.
//!
//! This binary loads daily rainfall and temperature series for Maharashtra
//! and Madhya Pradesh, validates each one, detects anomalies, and writes the
//! results as JSON. The `analyze` command additionally runs aggregation,
//! resilience scoring and economic impact estimation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use agroclim::output::{save_json, save_processed, save_summary};
use agroclim::pipeline::{analyze, load_datasets, validate_concurrently};
use agroclim::thresholds::{resolve_baseline, resolve_thresholds};
use agroclim_core::logging::init_logging;
use agroclim_core::{
    AgroclimError, Dataset, DateRange, QualityAnalyzer, QualityReport, Result, ValidationStatus,
};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "agroclim")]
#[command(about = "Climate data validation and anomaly detection")]
#[command(version)]
#[command(long_about = "
Agroclim - validation and anomaly detection for regional climate series

Reads four daily CSV files from the data directory:
  MH_precipitation.csv  MH_temperature.csv
  MP_precipitation.csv  MP_temperature.csv

Each dataset is checked for missing values, date continuity and physical
range, then scanned for extreme rainfall, dry spells, heat and cold stress
days, and seasonal (Kharif/Rabi) droughts or excess.

EXAMPLES:
  agroclim validate data/raw --summary validation_summary.csv
  agroclim analyze data/raw --range '2014-01-01 to 2023-12-31'
  agroclim analyze data/raw --processed-dir data/processed
  agroclim thresholds --threshold rainfall_max:200,heat_stress_c:37
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate the four datasets and write quality reports
    Validate(ValidateArgs),
    /// Validate, then run aggregation, resilience and impact analyses
    Analyze(AnalyzeArgs),
    /// Print the effective thresholds as JSON
    Thresholds(ThresholdArgs),
}

#[derive(Args)]
pub struct InputArgs {
    /// Directory holding the region CSV files
    #[arg(default_value = "data/raw", env = "AGROCLIM_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Declared coverage applied to every dataset
    #[arg(
        long,
        help = "Declared date range, e.g. '2014-01-01 to 2023-12-31' (inferred if omitted)"
    )]
    pub range: Option<DateRange>,
}

#[derive(Args)]
pub struct ThresholdArgs {
    /// JSON file with threshold values
    #[arg(long, help = "JSON file with threshold values (omitted keys keep defaults)")]
    pub thresholds_file: Option<PathBuf>,

    /// Threshold overrides (format: key:value)
    #[arg(
        long,
        value_delimiter = ',',
        help = "Threshold overrides (rainfall_max:150,dry_spell_min_days:15,heat_stress_c:35)"
    )]
    pub threshold: Vec<String>,

    /// Fixed Kharif baseline in mm
    #[arg(long, help = "Fixed Kharif seasonal mean in mm (requires --rabi-baseline)")]
    pub kharif_baseline: Option<f64>,

    /// Fixed Rabi baseline in mm
    #[arg(long, help = "Fixed Rabi seasonal mean in mm (requires --kharif-baseline)")]
    pub rabi_baseline: Option<f64>,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    /// Output file path
    #[arg(short, long, default_value = "quality_reports.json")]
    pub output: PathBuf,

    /// Summary CSV path
    #[arg(long, help = "Also write a one-row-per-dataset summary CSV")]
    pub summary: Option<PathBuf>,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    /// Output file path
    #[arg(short, long, default_value = "analysis_results.json")]
    pub output: PathBuf,

    /// Summary CSV path
    #[arg(long, help = "Also write a one-row-per-dataset summary CSV")]
    pub summary: Option<PathBuf>,

    /// Directory for per-dataset aggregate CSVs
    #[arg(
        long,
        help = "Also write <dataset>_monthly.csv and <dataset>_seasonal.csv into this directory"
    )]
    pub processed_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    match &cli.command {
        Command::Validate(args) => {
            let reports = run_validation(&args.input, &args.thresholds).await?.1;
            if let Some(summary) = &args.summary {
                save_summary(&reports, summary).await?;
            }
            save_json(&reports, &args.output).await?;
            log_outcome(&reports, &args.output);
            Ok(())
        }
        Command::Analyze(args) => {
            let (datasets, reports) = run_validation(&args.input, &args.thresholds).await?;
            if let Some(summary) = &args.summary {
                save_summary(&reports, summary).await?;
            }
            let results = analyze(&datasets, reports);
            if let Some(dir) = &args.processed_dir {
                save_processed(&results.aggregates, dir).await?;
            }
            for (region, analysis) in &results.resilience {
                info!(
                    "{}: resilience score {:.1}",
                    region, analysis.indicators.resilience_score
                );
            }
            info!("Estimated total loss: {:.0} INR", results.total_loss_inr);
            save_json(&results, &args.output).await?;
            log_outcome(&results.reports, &args.output);
            Ok(())
        }
        Command::Thresholds(args) => {
            let thresholds =
                resolve_thresholds(args.thresholds_file.as_deref(), &args.threshold).await?;
            let baseline = resolve_baseline(args.kharif_baseline, args.rabi_baseline)?;
            let analyzer = QualityAnalyzer::new(thresholds).with_seasonal_baseline(baseline);
            let json = serde_json::json!({
                "thresholds": analyzer.thresholds(),
                "seasonal_baseline": analyzer.seasonal_baseline(),
            });
            let text = serde_json::to_string_pretty(&json)
                .map_err(|e| AgroclimError::serialization("JSON serialization", e))?;
            println!("{}", text);
            Ok(())
        }
    }
}

/// Loads the datasets and validates them with the effective thresholds.
async fn run_validation(
    input: &InputArgs,
    threshold_args: &ThresholdArgs,
) -> Result<(Vec<Arc<Dataset>>, BTreeMap<String, QualityReport>)> {
    let thresholds =
        resolve_thresholds(threshold_args.thresholds_file.as_deref(), &threshold_args.threshold)
            .await?;
    let baseline = resolve_baseline(threshold_args.kharif_baseline, threshold_args.rabi_baseline)?;
    let analyzer = Arc::new(QualityAnalyzer::new(thresholds).with_seasonal_baseline(baseline));

    info!("Loading datasets from {}", input.data_dir.display());
    let datasets: Vec<_> = load_datasets(&input.data_dir, input.range)
        .await
        .map_err(|e| {
            error!("Failed to load datasets: {}", e);
            e
        })?
        .into_iter()
        .map(Arc::new)
        .collect();

    let reports = validate_concurrently(analyzer, datasets.clone()).await?;
    Ok((datasets, reports))
}

fn log_outcome(reports: &BTreeMap<String, QualityReport>, output: &Path) {
    for report in reports.values() {
        match report.status {
            ValidationStatus::Pass => info!("✓ {}: pass", report.dataset_name),
            ValidationStatus::Fail => warn!(
                "✗ {}: fail ({})",
                report.dataset_name,
                report
                    .checks
                    .as_ref()
                    .map(|c| c.failed_checks().join(", "))
                    .unwrap_or_default()
            ),
            ValidationStatus::Uncomputable => warn!(
                "? {}: uncomputable ({})",
                report.dataset_name,
                report.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
    info!("Results written to {}", output.display());
}
