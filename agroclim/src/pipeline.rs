//! Asynchronous orchestration of loading, validation and analysis.
//!
//! Files are read with `tokio::fs`, parsed in memory, and validated on the
//! blocking pool. Every task shares one analyzer through `Arc`, so all four
//! datasets are judged against the same immutable thresholds.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use agroclim_core::aggregate::{DatasetAggregates, aggregate};
use agroclim_core::impact::{ImpactRow, economic_impact, total_loss};
use agroclim_core::loader::{assemble_batch, read_records, standard_sources};
use agroclim_core::resilience::{
    Recommendations, RegionSeries, ResilienceIndicators, assess_region, recommend,
};
use agroclim_core::{
    AgroclimError, Dataset, DateRange, QualityAnalyzer, QualityReport, Region, Result,
    VariableKind,
};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Reads the four standard region files from `dir`.
///
/// When `range` is given it is claimed for every dataset; otherwise each
/// dataset's range is inferred from its first and last dates. A file with a
/// header but no rows takes the span of the other files, so it is still
/// validated and reported as uncomputable.
pub async fn load_datasets(dir: &Path, range: Option<DateRange>) -> Result<Vec<Dataset>> {
    let mut parsed = Vec::with_capacity(4);
    for (file_name, source) in standard_sources(range) {
        let path = dir.join(&file_name);
        let context = path.display().to_string();
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AgroclimError::Io {
                context: format!("Failed to read {}", context),
                source: e,
            })?;
        let records = read_records(text.as_bytes(), source.kind, &context)?;
        debug!(
            "Loaded {} records for '{}' from {}",
            records.len(),
            source.name,
            context
        );
        parsed.push((source, records));
    }
    assemble_batch(parsed)
}

/// Validates datasets in parallel on the blocking pool.
///
/// A dataset that cannot be analyzed yields an uncomputable report; the
/// batch only fails on invalid thresholds or a panicked task.
pub async fn validate_concurrently(
    analyzer: Arc<QualityAnalyzer>,
    datasets: Vec<Arc<Dataset>>,
) -> Result<BTreeMap<String, QualityReport>> {
    analyzer.thresholds().validate()?;

    let mut tasks = JoinSet::new();
    for dataset in datasets {
        let analyzer = Arc::clone(&analyzer);
        tasks.spawn_blocking(move || analyzer.report(&dataset));
    }

    let mut reports = BTreeMap::new();
    while let Some(joined) = tasks.join_next().await {
        let report = joined.map_err(|e| {
            AgroclimError::configuration(format!("validation task failed: {}", e))
        })?;
        if let Some(previous) = reports.insert(report.dataset_name.clone(), report) {
            warn!(
                "Duplicate dataset name '{}'; keeping one report",
                previous.dataset_name
            );
        }
    }
    info!("Validated {} datasets", reports.len());
    Ok(reports)
}

/// Resilience assessment and recommendations for one region.
#[derive(Debug, Clone, Serialize)]
pub struct RegionAnalysis {
    /// Computed indicators and scores
    pub indicators: ResilienceIndicators,
    /// Recommendations derived from the indicators and economic impact
    pub recommendations: Recommendations,
}

/// Everything the `analyze` command produces.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResults {
    /// Validation reports keyed by dataset name
    pub reports: BTreeMap<String, QualityReport>,
    /// Monthly and seasonal aggregates keyed by dataset name
    pub aggregates: BTreeMap<String, DatasetAggregates>,
    /// Per-region resilience results
    pub resilience: BTreeMap<Region, RegionAnalysis>,
    /// Per-crop economic impact rows for both regions
    pub economic_impact: Vec<ImpactRow>,
    /// Sum of all estimated losses in INR
    pub total_loss_inr: f64,
}

/// Runs the downstream analyses over validated datasets.
///
/// Regions missing either series or report are skipped with a warning.
pub fn analyze(
    datasets: &[Arc<Dataset>],
    reports: BTreeMap<String, QualityReport>,
) -> AnalysisResults {
    let by_name: BTreeMap<&str, &Dataset> =
        datasets.iter().map(|d| (d.name(), d.as_ref())).collect();

    let mut aggregates = BTreeMap::new();
    for (name, report) in &reports {
        if let Some(&dataset) = by_name.get(name.as_str()) {
            aggregates.insert(name.clone(), aggregate(dataset, report));
        }
    }

    let mut resilience = BTreeMap::new();
    let mut impact = Vec::new();
    for region in Region::ALL {
        let rain_name = region.dataset_name(VariableKind::Rainfall);
        let temp_name = region.dataset_name(VariableKind::Temperature);
        let parts = (
            by_name.get(rain_name.as_str()).copied(),
            reports.get(&rain_name),
            by_name.get(temp_name.as_str()).copied(),
            reports.get(&temp_name),
        );
        let (Some(rainfall), Some(rainfall_report), Some(temperature), Some(temperature_report)) =
            parts
        else {
            warn!("Skipping {} analysis: datasets incomplete", region);
            continue;
        };

        let region_impact = economic_impact(region, rainfall_report);
        let series = RegionSeries {
            rainfall,
            rainfall_report,
            temperature,
            temperature_report,
        };
        let indicators = assess_region(region, &series);
        let recommendations = recommend(&indicators, &region_impact);
        resilience.insert(
            region,
            RegionAnalysis {
                indicators,
                recommendations,
            },
        );
        impact.extend(region_impact);
    }

    let total_loss_inr = total_loss(&impact);
    AnalysisResults {
        reports,
        aggregates,
        resilience,
        economic_impact: impact,
        total_loss_inr,
    }
}
