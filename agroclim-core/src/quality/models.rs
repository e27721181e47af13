//! Quality report models.
//!
//! This module defines the data structures produced by the validation
//! core: per-check results, the anomaly taxonomy, and the per-dataset
//! [`QualityReport`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AgroclimError;
use crate::models::{DateRange, VariableKind};

use super::seasons::Season;
use super::statistics::Statistics;

/// Overall validation status for one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    /// Every check passed
    Pass,
    /// At least one check failed
    Fail,
    /// Statistics could not be computed, so no checks ran
    Uncomputable,
}

impl ValidationStatus {
    /// Returns the lowercase status name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Pass => "pass",
            ValidationStatus::Fail => "fail",
            ValidationStatus::Uncomputable => "uncomputable",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationStatus {
    type Err = AgroclimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pass" => Ok(ValidationStatus::Pass),
            "fail" => Ok(ValidationStatus::Fail),
            "uncomputable" => Ok(ValidationStatus::Uncomputable),
            other => Err(AgroclimError::configuration(format!(
                "unknown validation status '{}'",
                other
            ))),
        }
    }
}

/// Result of the missing-values check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissingValuesCheck {
    /// True when no record lacks a value
    pub passed: bool,
    /// Number of records with an absent value
    pub missing_count: u64,
    /// Dates of records with an absent value
    pub missing_dates: Vec<NaiveDate>,
}

/// Result of the date continuity check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuityCheck {
    /// True when every day is present exactly once
    pub passed: bool,
    /// Days in the declared range
    pub expected_days: i64,
    /// Records actually present
    pub actual_days: i64,
    /// `expected_days - actual_days`
    pub missing_days: i64,
    /// Calendar days in the declared range with no record
    pub missing_dates: Vec<NaiveDate>,
    /// Dates that occur more than once (each listed once)
    pub duplicate_dates: Vec<NaiveDate>,
}

/// Result of the value range check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeCheck {
    /// True when every present value lies within bounds
    pub passed: bool,
    /// Variable whose bounds were applied
    pub variable: VariableKind,
    /// Inclusive lower bound
    pub lower_bound: f64,
    /// Inclusive upper bound
    pub upper_bound: f64,
    /// Smallest present value, if any
    pub min_observed: Option<f64>,
    /// Largest present value, if any
    pub max_observed: Option<f64>,
    /// Dates whose value lies outside the bounds
    pub out_of_range_dates: Vec<NaiveDate>,
}

/// All check results for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityChecks {
    /// Missing-values check
    pub missing_values: MissingValuesCheck,
    /// Continuity check
    pub continuity: ContinuityCheck,
    /// Range check
    pub range: RangeCheck,
}

impl QualityChecks {
    /// Returns true if every check passed.
    pub fn all_passed(&self) -> bool {
        self.missing_values.passed && self.continuity.passed && self.range.passed
    }

    /// Names of the checks that failed, in report order.
    pub fn failed_checks(&self) -> Vec<&'static str> {
        let mut failed = Vec::new();
        if !self.missing_values.passed {
            failed.push("missing_values");
        }
        if !self.continuity.passed {
            failed.push("continuity");
        }
        if !self.range.passed {
            failed.push("range");
        }
        failed
    }
}

/// Direction of a seasonal rainfall anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalAnomalyKind {
    /// Seasonal total below the drought ratio of the baseline
    Drought,
    /// Seasonal total above the excess ratio of the baseline
    Excess,
}

/// A detected climate anomaly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnomalyRecord {
    /// Rainfall strictly above the dataset's 95th percentile
    ExtremeEvent {
        date: NaiveDate,
        value: f64,
        threshold: f64,
    },
    /// Maximal run of consecutive dry days
    DrySpell {
        start_date: NaiveDate,
        end_date: NaiveDate,
        duration_days: u32,
    },
    /// Temperature above the heat-stress threshold
    HeatStressDay { date: NaiveDate, value: f64 },
    /// Temperature below the cold-stress threshold
    ColdStressDay { date: NaiveDate, value: f64 },
    /// Season-year whose total rainfall deviates from the baseline
    SeasonalAnomaly {
        year: i32,
        season: Season,
        kind: SeasonalAnomalyKind,
        total_mm: f64,
        baseline_mm: f64,
        ratio_to_mean: f64,
    },
}

impl AnomalyRecord {
    /// Date used to order anomalies: the day itself, the start of a dry
    /// spell, or the first day of an anomalous season.
    pub fn anchor_date(&self) -> NaiveDate {
        match self {
            AnomalyRecord::ExtremeEvent { date, .. }
            | AnomalyRecord::HeatStressDay { date, .. }
            | AnomalyRecord::ColdStressDay { date, .. } => *date,
            AnomalyRecord::DrySpell { start_date, .. } => *start_date,
            AnomalyRecord::SeasonalAnomaly { year, season, .. } => season.start_date(*year),
        }
    }
}

/// Per-kind anomaly counts for summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyCounts {
    /// Extreme rainfall days
    pub extreme_events: u64,
    /// Dry spells
    pub dry_spells: u64,
    /// Longest dry spell in days
    pub longest_dry_spell_days: u32,
    /// Heat-stress days
    pub heat_stress_days: u64,
    /// Cold-stress days
    pub cold_stress_days: u64,
    /// Drought season-years
    pub droughts: u64,
    /// Excess-rainfall season-years
    pub excess_seasons: u64,
}

impl AnomalyCounts {
    /// Tallies a list of anomalies.
    pub fn from_anomalies(anomalies: &[AnomalyRecord]) -> Self {
        let mut counts = Self::default();
        for anomaly in anomalies {
            match anomaly {
                AnomalyRecord::ExtremeEvent { .. } => counts.extreme_events += 1,
                AnomalyRecord::DrySpell { duration_days, .. } => {
                    counts.dry_spells += 1;
                    counts.longest_dry_spell_days =
                        counts.longest_dry_spell_days.max(*duration_days);
                }
                AnomalyRecord::HeatStressDay { .. } => counts.heat_stress_days += 1,
                AnomalyRecord::ColdStressDay { .. } => counts.cold_stress_days += 1,
                AnomalyRecord::SeasonalAnomaly { kind, .. } => match kind {
                    SeasonalAnomalyKind::Drought => counts.droughts += 1,
                    SeasonalAnomalyKind::Excess => counts.excess_seasons += 1,
                },
            }
        }
        counts
    }

    /// Total seasonal anomalies of either kind.
    pub fn seasonal_anomalies(&self) -> u64 {
        self.droughts + self.excess_seasons
    }
}

/// Complete validation report for a single dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Dataset name, e.g. `mh_precip`
    pub dataset_name: String,
    /// Variable carried by the dataset
    pub variable: VariableKind,
    /// Number of records, including those with missing values
    pub total_records: u64,
    /// Declared date range
    pub date_range: DateRange,
    /// Check results; absent when the dataset was uncomputable
    pub checks: Option<QualityChecks>,
    /// Descriptive statistics; absent when the dataset was uncomputable
    pub statistics: Option<Statistics>,
    /// Detected anomalies in date order
    pub anomalies: Vec<AnomalyRecord>,
    /// Overall status
    pub status: ValidationStatus,
    /// Why the dataset could not be analyzed
    pub error: Option<String>,
    /// Timestamp when analysis was performed
    pub analyzed_at: DateTime<Utc>,
}

impl QualityReport {
    /// Creates a report from completed checks.
    ///
    /// The status is `Fail` exactly when one of the checks failed; anomalies
    /// never affect it.
    pub fn new(
        dataset_name: impl Into<String>,
        variable: VariableKind,
        total_records: u64,
        date_range: DateRange,
        checks: QualityChecks,
        statistics: Statistics,
    ) -> Self {
        let status = if checks.all_passed() {
            ValidationStatus::Pass
        } else {
            ValidationStatus::Fail
        };
        Self {
            dataset_name: dataset_name.into(),
            variable,
            total_records,
            date_range,
            checks: Some(checks),
            statistics: Some(statistics),
            anomalies: Vec::new(),
            status,
            error: None,
            analyzed_at: Utc::now(),
        }
    }

    /// Creates a report for a dataset whose statistics could not be computed.
    pub fn uncomputable(
        dataset_name: impl Into<String>,
        variable: VariableKind,
        total_records: u64,
        date_range: DateRange,
        error: impl Into<String>,
    ) -> Self {
        Self {
            dataset_name: dataset_name.into(),
            variable,
            total_records,
            date_range,
            checks: None,
            statistics: None,
            anomalies: Vec::new(),
            status: ValidationStatus::Uncomputable,
            error: Some(error.into()),
            analyzed_at: Utc::now(),
        }
    }

    /// Sets the anomaly list.
    pub fn with_anomalies(mut self, anomalies: Vec<AnomalyRecord>) -> Self {
        self.anomalies = anomalies;
        self
    }

    /// Returns true if the dataset passed every check.
    pub fn passed(&self) -> bool {
        self.status == ValidationStatus::Pass
    }

    /// Per-kind anomaly counts.
    pub fn anomaly_counts(&self) -> AnomalyCounts {
        AnomalyCounts::from_anomalies(&self.anomalies)
    }

    /// Returns true if the value recorded on `date` passed the range check.
    ///
    /// Uncomputable reports accept nothing.
    pub fn is_in_range(&self, date: NaiveDate) -> bool {
        match &self.checks {
            Some(checks) => checks.range.out_of_range_dates.binary_search(&date).is_err(),
            None => false,
        }
    }

    /// Seasonal anomalies as `(year, season, kind)` triples.
    pub fn seasonal_anomalies(
        &self,
    ) -> impl Iterator<Item = (i32, Season, SeasonalAnomalyKind)> + '_ {
        self.anomalies.iter().filter_map(|anomaly| match anomaly {
            AnomalyRecord::SeasonalAnomaly {
                year, season, kind, ..
            } => Some((*year, *season, *kind)),
            _ => None,
        })
    }
}
