//! Date continuity analysis.
//!
//! Compares the records of a dataset against every calendar day in its
//! declared range. Gaps and duplicate dates are both reported; the check
//! passes only when each day appears exactly once.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::models::Dataset;

use super::models::ContinuityCheck;

/// Analyzes the date continuity of `dataset` against its declared range.
///
/// `missing_days` is `expected_days - actual_days` and therefore goes
/// negative when duplicates outnumber gaps. `missing_dates` lists the
/// calendar days with no record regardless of duplicates elsewhere.
pub fn analyze_continuity(dataset: &Dataset) -> ContinuityCheck {
    let range = dataset.range();
    let expected_days = range.expected_days();
    let actual_days = dataset.len() as i64;

    let mut seen: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut duplicates: BTreeSet<NaiveDate> = BTreeSet::new();
    for record in dataset.records() {
        if !seen.insert(record.date) {
            duplicates.insert(record.date);
        }
    }

    let missing_dates: Vec<NaiveDate> = range.days().filter(|day| !seen.contains(day)).collect();
    let duplicate_dates: Vec<NaiveDate> = duplicates.into_iter().collect();

    ContinuityCheck {
        passed: missing_dates.is_empty() && duplicate_dates.is_empty(),
        expected_days,
        actual_days,
        missing_days: expected_days - actual_days,
        missing_dates,
        duplicate_dates,
    }
}
