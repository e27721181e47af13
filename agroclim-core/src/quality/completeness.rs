//! Missing-value analysis.
//!
//! Counts records whose value cell was empty. A record that exists with no
//! value is different from a day with no record at all; the latter is a
//! continuity gap.

use crate::models::Dataset;

use super::models::MissingValuesCheck;

/// Analyzes the records of `dataset` for absent values.
///
/// Passes when every record carries a value, including the trivial case of
/// a dataset with no records.
pub fn analyze_missing_values(dataset: &Dataset) -> MissingValuesCheck {
    let missing_dates: Vec<_> = dataset
        .records()
        .iter()
        .filter(|record| record.value.is_none())
        .map(|record| record.date)
        .collect();

    MissingValuesCheck {
        passed: missing_dates.is_empty(),
        missing_count: missing_dates.len() as u64,
        missing_dates,
    }
}
