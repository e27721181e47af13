//! Climate data validation and anomaly detection.
//!
//! This module provides the validation core:
//! - **Statistics**: mean, sample standard deviation, median, 95th percentile
//! - **Continuity**: gaps and duplicates against the declared date range
//! - **Range**: physical bounds for rainfall and temperature
//! - **Missing values**: records with an empty value cell
//! - **Anomaly Detection**: extreme rainfall, dry spells, heat and cold
//!   stress, seasonal drought and excess
//!
//! Check failures are recorded in the [`QualityReport`]; only an empty
//! series or invalid thresholds produce an error.
//!
//! # Example
//! ```rust,ignore
//! use agroclim_core::quality::{QualityAnalyzer, Thresholds};
//!
//! let analyzer = QualityAnalyzer::new(Thresholds::default());
//! let reports = analyzer.analyze_all(&datasets)?;
//! for (name, report) in &reports {
//!     println!("{name}: {}", report.status);
//! }
//! ```

mod analyzer;
pub mod anomaly;
mod completeness;
mod config;
mod continuity;
mod models;
mod range;
pub mod seasons;
pub mod statistics;

// Re-export public API
pub use analyzer::QualityAnalyzer;
pub use completeness::analyze_missing_values;
pub use config::{ConfigValidationError, Thresholds};
pub use continuity::analyze_continuity;
pub use models::{
    AnomalyCounts, AnomalyRecord, ContinuityCheck, MissingValuesCheck, QualityChecks,
    QualityReport, RangeCheck, SeasonalAnomalyKind, ValidationStatus,
};
pub use range::{analyze_range, bounds_for};
pub use seasons::{Season, SeasonalBaseline, SeasonalTotal};
pub use statistics::{Statistics, percentile};
