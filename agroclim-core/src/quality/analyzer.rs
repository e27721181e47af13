//! Validation orchestrator.
//!
//! This module provides the `QualityAnalyzer` that runs every check on a
//! dataset and assembles the resulting [`QualityReport`].

use std::collections::BTreeMap;

use crate::Result;
use crate::models::Dataset;

use super::anomaly::detect_anomalies;
use super::completeness::analyze_missing_values;
use super::config::Thresholds;
use super::continuity::analyze_continuity;
use super::models::{QualityChecks, QualityReport};
use super::range::analyze_range;
use super::seasons::SeasonalBaseline;
use super::statistics::Statistics;

/// Quality analyzer for climate datasets.
///
/// The analyzer holds the immutable thresholds and seasonal baseline for a
/// run and can be shared between threads.
///
/// # Example
///
/// ```rust,ignore
/// use agroclim_core::quality::QualityAnalyzer;
///
/// let analyzer = QualityAnalyzer::with_defaults();
/// let report = analyzer.analyze(&dataset)?;
/// println!("{}: {}", report.dataset_name, report.status);
/// ```
#[derive(Debug, Clone)]
pub struct QualityAnalyzer {
    thresholds: Thresholds,
    baseline: SeasonalBaseline,
}

impl QualityAnalyzer {
    /// Creates a new analyzer with the given thresholds and an in-sample
    /// seasonal baseline.
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            baseline: SeasonalBaseline::default(),
        }
    }

    /// Creates a new analyzer with default thresholds.
    pub fn with_defaults() -> Self {
        Self::new(Thresholds::default())
    }

    /// Builder method to set the seasonal baseline.
    pub fn with_seasonal_baseline(mut self, baseline: SeasonalBaseline) -> Self {
        self.baseline = baseline;
        self
    }

    /// Returns a reference to the analyzer thresholds.
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Returns a reference to the seasonal baseline.
    pub fn seasonal_baseline(&self) -> &SeasonalBaseline {
        &self.baseline
    }

    /// Analyzes a single dataset.
    ///
    /// Runs statistics, continuity, range, missing-values and anomaly
    /// detection in that order.
    ///
    /// # Errors
    /// Returns [`crate::AgroclimError::Thresholds`] when the thresholds are
    /// invalid and [`crate::AgroclimError::InsufficientData`] when the dataset
    /// has no present values.
    pub fn analyze(&self, dataset: &Dataset) -> Result<QualityReport> {
        self.thresholds.validate()?;

        let statistics = Statistics::compute(dataset.name(), &dataset.values())?;
        let continuity = analyze_continuity(dataset);
        let range = analyze_range(dataset, &self.thresholds);
        let missing_values = analyze_missing_values(dataset);
        let anomalies = detect_anomalies(dataset, &statistics, &self.thresholds, &self.baseline);

        let checks = QualityChecks {
            missing_values,
            continuity,
            range,
        };

        let report = QualityReport::new(
            dataset.name(),
            dataset.kind(),
            dataset.len() as u64,
            dataset.range(),
            checks,
            statistics,
        )
        .with_anomalies(anomalies);

        tracing::debug!(
            dataset = %report.dataset_name,
            status = %report.status,
            anomalies = report.anomalies.len(),
            "Dataset analyzed"
        );

        Ok(report)
    }

    /// Analyzes a dataset, turning analysis failures into an uncomputable
    /// report.
    pub fn report(&self, dataset: &Dataset) -> QualityReport {
        match self.analyze(dataset) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("Validation failed for dataset '{}': {}", dataset.name(), e);
                QualityReport::uncomputable(
                    dataset.name(),
                    dataset.kind(),
                    dataset.len() as u64,
                    dataset.range(),
                    e.to_string(),
                )
            }
        }
    }

    /// Analyzes multiple datasets and returns a report for each, keyed by
    /// dataset name.
    ///
    /// Datasets that cannot be analyzed are logged and reported as
    /// uncomputable rather than aborting the batch. When two datasets share
    /// a name, the later one wins.
    ///
    /// # Errors
    /// Fails before analyzing anything if the thresholds are invalid.
    pub fn analyze_all(&self, datasets: &[Dataset]) -> Result<BTreeMap<String, QualityReport>> {
        self.thresholds.validate()?;

        let mut reports = BTreeMap::new();
        for dataset in datasets {
            let report = self.report(dataset);
            if reports.insert(report.dataset_name.clone(), report).is_some() {
                tracing::warn!(
                    "Duplicate dataset name '{}'; keeping the later report",
                    dataset.name()
                );
            }
        }
        Ok(reports)
    }
}

impl Default for QualityAnalyzer {
    fn default() -> Self {
        Self::with_defaults()
    }
}
