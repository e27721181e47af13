//! Core data structures and analysis for agroclim.
//!
//! This crate validates daily rainfall and temperature series for
//! Maharashtra and Madhya Pradesh, detects climate anomalies, and derives
//! the aggregates, resilience indicators and crop-impact estimates built on
//! top of validated data.
//!
//! # Architecture
//! - [`loader`] turns delimited text into immutable [`Dataset`]s
//! - [`quality`] runs the checks and anomaly detectors and builds one
//!   [`QualityReport`] per dataset
//! - [`aggregate`], [`resilience`], [`impact`] and [`summary`] consume the
//!   reports together with the validated series
//!
//! Every check is a pure function of a dataset and the immutable
//! [`Thresholds`]; nothing in this crate writes files.

pub mod aggregate;
pub mod error;
pub mod impact;
pub mod loader;
pub mod logging;
pub mod models;
pub mod quality;
pub mod resilience;
pub mod summary;

// Re-export commonly used types
pub use error::{AgroclimError, Result};
pub use models::{DATE_FORMAT, Dataset, DateRange, Region, TimeSeriesRecord, VariableKind};
pub use quality::{
    AnomalyRecord, QualityAnalyzer, QualityReport, SeasonalBaseline, Statistics, Thresholds,
    ValidationStatus,
};
