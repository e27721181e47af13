//! Physical range validation.
//!
//! Rainfall must lie in `[0, rainfall_max]`; temperature in
//! `[temp_min, temp_max]`. Both bounds are inclusive. Missing values are
//! skipped here and reported by the missing-values check instead.

use crate::models::{Dataset, VariableKind};

use super::config::Thresholds;
use super::models::RangeCheck;

/// Returns the inclusive `(lower, upper)` bounds for a variable.
pub fn bounds_for(kind: VariableKind, thresholds: &Thresholds) -> (f64, f64) {
    match kind {
        VariableKind::Rainfall => (0.0, thresholds.rainfall_max),
        VariableKind::Temperature => (thresholds.temp_min, thresholds.temp_max),
    }
}

/// Analyzes the present values of `dataset` against its physical bounds.
pub fn analyze_range(dataset: &Dataset, thresholds: &Thresholds) -> RangeCheck {
    let (lower_bound, upper_bound) = bounds_for(dataset.kind(), thresholds);

    let mut min_observed: Option<f64> = None;
    let mut max_observed: Option<f64> = None;
    let mut out_of_range_dates = Vec::new();

    for record in dataset.records() {
        let Some(value) = record.value else {
            continue;
        };
        min_observed = Some(min_observed.map_or(value, |m| m.min(value)));
        max_observed = Some(max_observed.map_or(value, |m| m.max(value)));

        // NaN fails both comparisons, so it is treated as out of range.
        let within = value >= lower_bound && value <= upper_bound;
        if !within && out_of_range_dates.last() != Some(&record.date) {
            out_of_range_dates.push(record.date);
        }
    }

    RangeCheck {
        passed: out_of_range_dates.is_empty(),
        variable: dataset.kind(),
        lower_bound,
        upper_bound,
        min_observed,
        max_observed,
        out_of_range_dates,
    }
}
