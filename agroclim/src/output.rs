//! File output for validation and analysis results.

use std::collections::BTreeMap;
use std::path::Path;

use agroclim_core::aggregate::DatasetAggregates;
use agroclim_core::summary::summary_to_string;
use agroclim_core::{AgroclimError, QualityReport, Result};
use serde::Serialize;

/// Serializes `value` as pretty JSON and writes it to `output_path`.
pub async fn save_json<T: Serialize>(value: &T, output_path: &Path) -> Result<()> {
    let json_data = serde_json::to_string_pretty(value)
        .map_err(|e| AgroclimError::serialization("JSON serialization", e))?;
    write_text(&json_data, output_path).await
}

/// Writes the one-row-per-dataset summary CSV.
pub async fn save_summary(
    reports: &BTreeMap<String, QualityReport>,
    output_path: &Path,
) -> Result<()> {
    let text = summary_to_string(reports.values())?;
    write_text(&text, output_path).await
}

/// Writes `<dataset>_monthly.csv` and `<dataset>_seasonal.csv` for every
/// dataset into `dir`, creating it if needed.
pub async fn save_processed(
    aggregates: &BTreeMap<String, DatasetAggregates>,
    dir: &Path,
) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AgroclimError::Io {
            context: format!("Failed to create {}", dir.display()),
            source: e,
        })?;
    for (name, dataset) in aggregates {
        let monthly = dataset.monthly_csv()?;
        write_text(&monthly, &dir.join(format!("{}_monthly.csv", name))).await?;
        let seasonal = dataset.seasonal_csv()?;
        write_text(&seasonal, &dir.join(format!("{}_seasonal.csv", name))).await?;
    }
    Ok(())
}

async fn write_text(text: &str, output_path: &Path) -> Result<()> {
    tokio::fs::write(output_path, text)
        .await
        .map_err(|e| AgroclimError::Io {
            context: format!("Failed to write to {}", output_path.display()),
            source: e,
        })?;
    tracing::info!("Wrote {}", output_path.display());
    Ok(())
}
