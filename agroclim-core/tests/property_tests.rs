//! Property-based tests for the validation core.
//!
//! Each property generates daily series with controlled gaps, dry runs and
//! value ranges, and checks an invariant that must hold for every input.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use agroclim_core::quality::anomaly::{detect_dry_spells, detect_stress_days};
use agroclim_core::quality::{AnomalyRecord, Thresholds, analyze_continuity, analyze_range};
use agroclim_core::{Dataset, DateRange, TimeSeriesRecord, VariableKind};
use chrono::{Days, NaiveDate};
use proptest::prelude::*;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2014, 1, 1).unwrap()
}

/// Builds a dataset from per-day values starting at 2014-01-01, skipping
/// days flagged in `gaps`.
fn build(kind: VariableKind, values: &[f64], gaps: &[bool]) -> Dataset {
    let end = start() + Days::new(values.len().saturating_sub(1) as u64);
    let range = DateRange::new(start(), end).unwrap();
    let records = values
        .iter()
        .enumerate()
        .filter(|(i, _)| !gaps.get(*i).copied().unwrap_or(false))
        .map(|(i, v)| TimeSeriesRecord::new(start() + Days::new(i as u64), *v))
        .collect();
    Dataset::new("prop", kind, range, records).unwrap()
}

/// Rainfall that is mostly dry with occasional showers.
fn rainfall_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        prop_oneof![
            3 => Just(0.0),
            1 => 0.0f64..0.99,
            1 => 1.0f64..80.0,
        ],
        1..400,
    )
}

proptest! {
    #[test]
    fn complete_series_pass_continuity(len in 1usize..800) {
        let values = vec![1.0; len];
        let check = analyze_continuity(&build(VariableKind::Rainfall, &values, &[]));
        prop_assert!(check.passed);
        prop_assert_eq!(check.missing_days, 0);
        prop_assert_eq!(check.expected_days, len as i64);
    }

    #[test]
    fn gaps_are_counted_exactly(gaps in prop::collection::vec(any::<bool>(), 2..300)) {
        let mut gaps = gaps;
        // Keep both ends so the declared range stays fixed
        let last = gaps.len() - 1;
        gaps[0] = false;
        gaps[last] = false;
        let values = vec![1.0; gaps.len()];
        let check = analyze_continuity(&build(VariableKind::Rainfall, &values, &gaps));

        let expected_gaps = gaps.iter().filter(|g| **g).count();
        prop_assert_eq!(check.missing_days, expected_gaps as i64);
        prop_assert_eq!(check.missing_dates.len(), expected_gaps);
        prop_assert_eq!(check.passed, expected_gaps == 0);
    }

    #[test]
    fn rainfall_range_matches_bounds(values in prop::collection::vec(-50.0f64..250.0, 1..200)) {
        let dataset = build(VariableKind::Rainfall, &values, &[]);
        let check = analyze_range(&dataset, &Thresholds::default());
        let expected = values.iter().filter(|v| **v < 0.0 || **v > 150.0).count();
        prop_assert_eq!(check.out_of_range_dates.len(), expected);
    }

    #[test]
    fn temperature_range_matches_bounds(values in prop::collection::vec(-20.0f64..70.0, 1..200)) {
        let dataset = build(VariableKind::Temperature, &values, &[]);
        let check = analyze_range(&dataset, &Thresholds::default());
        let expected = values.iter().filter(|v| **v < -5.0 || **v > 50.0).count();
        prop_assert_eq!(check.out_of_range_dates.len(), expected);
    }

    #[test]
    fn dry_spells_are_sorted_disjoint_and_idempotent(
        values in rainfall_values(),
        min_days in 1u32..20,
    ) {
        let dataset = build(VariableKind::Rainfall, &values, &[]);
        let thresholds = Thresholds::default().with_dry_spell_min_days(min_days);

        let spells = detect_dry_spells(&dataset, &thresholds);
        prop_assert_eq!(&spells, &detect_dry_spells(&dataset, &thresholds));

        let bounds: Vec<(NaiveDate, NaiveDate, u32)> = spells
            .iter()
            .map(|s| match s {
                AnomalyRecord::DrySpell { start_date, end_date, duration_days } => {
                    (*start_date, *end_date, *duration_days)
                }
                other => panic!("unexpected anomaly {other:?}"),
            })
            .collect();

        for (start_date, end_date, duration) in &bounds {
            prop_assert!(*duration >= min_days);
            prop_assert_eq!((*end_date - *start_date).num_days() + 1, i64::from(*duration));
        }
        for pair in bounds.windows(2) {
            // Maximal runs are separated by at least one wet day
            prop_assert!(pair[0].1 + Days::new(1) < pair[1].0);
        }
    }

    #[test]
    fn no_day_is_both_hot_and_cold(values in prop::collection::vec(-5.0f64..50.0, 1..300)) {
        let dataset = build(VariableKind::Temperature, &values, &[]);
        let stress = detect_stress_days(&dataset, &Thresholds::default());

        let mut hot = Vec::new();
        let mut cold = Vec::new();
        for record in &stress {
            match record {
                AnomalyRecord::HeatStressDay { date, .. } => hot.push(*date),
                AnomalyRecord::ColdStressDay { date, .. } => cold.push(*date),
                other => panic!("unexpected anomaly {other:?}"),
            }
        }
        prop_assert!(hot.iter().all(|d| !cold.contains(d)));
        prop_assert_eq!(hot.len(), values.iter().filter(|v| **v > 35.0).count());
        prop_assert_eq!(cold.len(), values.iter().filter(|v| **v < 15.0).count());
    }
}
