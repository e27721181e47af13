//! Climate anomaly detection.
//!
//! Rainfall series are scanned for extreme events, dry spells and seasonal
//! drought or excess. Temperature series are scanned for heat and cold
//! stress days. Every detector is a pure function of the dataset and its
//! inputs; [`detect_anomalies`] merges their output into a single
//! date-ordered list.

use chrono::NaiveDate;

use crate::models::{Dataset, VariableKind};

use super::config::Thresholds;
use super::models::{AnomalyRecord, SeasonalAnomalyKind};
use super::seasons::{SeasonalBaseline, seasonal_totals};
use super::statistics::Statistics;

/// Runs every detector that applies to the dataset's variable.
///
/// The result is sorted by [`AnomalyRecord::anchor_date`]; records sharing
/// an anchor keep detector order.
pub fn detect_anomalies(
    dataset: &Dataset,
    statistics: &Statistics,
    thresholds: &Thresholds,
    baseline: &SeasonalBaseline,
) -> Vec<AnomalyRecord> {
    let mut anomalies = match dataset.kind() {
        VariableKind::Rainfall => {
            let mut found = detect_extreme_events(dataset, statistics);
            found.extend(detect_dry_spells(dataset, thresholds));
            found.extend(detect_seasonal_anomalies(dataset, thresholds, baseline));
            found
        }
        VariableKind::Temperature => detect_stress_days(dataset, thresholds),
    };
    anomalies.sort_by_key(AnomalyRecord::anchor_date);
    anomalies
}

/// Flags days whose value is strictly greater than the 95th percentile.
pub fn detect_extreme_events(dataset: &Dataset, statistics: &Statistics) -> Vec<AnomalyRecord> {
    let threshold = statistics.percentile_95;
    dataset
        .records()
        .iter()
        .filter_map(|record| {
            let value = record.value?;
            (value > threshold).then_some(AnomalyRecord::ExtremeEvent {
                date: record.date,
                value,
                threshold,
            })
        })
        .collect()
}

/// Finds maximal runs of consecutive dry days.
///
/// A day is dry when its value is present and below `dry_day_max_mm`. A wet
/// day, a missing value, or a gap in the dates ends the run. A repeated
/// date never starts or extends a run, but a wet repeat ends one. Runs of
/// at least `dry_spell_min_days` days are reported.
pub fn detect_dry_spells(dataset: &Dataset, thresholds: &Thresholds) -> Vec<AnomalyRecord> {
    let min_days = thresholds.dry_spell_min_days;
    let mut spells = Vec::new();
    let mut run: Option<(NaiveDate, NaiveDate)> = None;
    let mut previous: Option<NaiveDate> = None;

    for record in dataset.records() {
        let dry = record
            .value
            .is_some_and(|value| value < thresholds.dry_day_max_mm);
        let repeated = previous == Some(record.date);
        previous = Some(record.date);

        if repeated {
            if !dry {
                close_spell(&mut spells, run.take(), min_days);
            }
            continue;
        }

        match run {
            Some((start, end)) if dry && end.succ_opt() == Some(record.date) => {
                run = Some((start, record.date));
            }
            _ => {
                close_spell(&mut spells, run.take(), min_days);
                if dry {
                    run = Some((record.date, record.date));
                }
            }
        }
    }
    close_spell(&mut spells, run, min_days);

    spells
}

fn close_spell(
    spells: &mut Vec<AnomalyRecord>,
    run: Option<(NaiveDate, NaiveDate)>,
    min_days: u32,
) {
    let Some((start_date, end_date)) = run else {
        return;
    };
    let duration_days = u32::try_from((end_date - start_date).num_days() + 1).unwrap_or(u32::MAX);
    if duration_days >= min_days {
        spells.push(AnomalyRecord::DrySpell {
            start_date,
            end_date,
            duration_days,
        });
    }
}

/// Flags heat-stress days (above `heat_stress_c`) and cold-stress days
/// (below `cold_stress_c`).
pub fn detect_stress_days(dataset: &Dataset, thresholds: &Thresholds) -> Vec<AnomalyRecord> {
    dataset
        .records()
        .iter()
        .filter_map(|record| {
            let value = record.value?;
            if value > thresholds.heat_stress_c {
                Some(AnomalyRecord::HeatStressDay {
                    date: record.date,
                    value,
                })
            } else if value < thresholds.cold_stress_c {
                Some(AnomalyRecord::ColdStressDay {
                    date: record.date,
                    value,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Compares each complete season-year's rainfall with the baseline.
///
/// Seasons whose baseline is zero or unavailable are skipped.
pub fn detect_seasonal_anomalies(
    dataset: &Dataset,
    thresholds: &Thresholds,
    baseline: &SeasonalBaseline,
) -> Vec<AnomalyRecord> {
    let present = dataset
        .records()
        .iter()
        .filter_map(|record| record.value.map(|value| (record.date, value)));
    let totals = seasonal_totals(dataset.range(), present);

    totals
        .iter()
        .filter_map(|total| {
            let baseline_mm = baseline.baseline_for(total.season, &totals)?;
            if baseline_mm <= 0.0 || !baseline_mm.is_finite() {
                return None;
            }
            let ratio_to_mean = total.total_mm / baseline_mm;
            let kind = classify_seasonal_ratio(ratio_to_mean, thresholds)?;
            Some(AnomalyRecord::SeasonalAnomaly {
                year: total.year,
                season: total.season,
                kind,
                total_mm: total.total_mm,
                baseline_mm,
                ratio_to_mean,
            })
        })
        .collect()
}

/// Classifies a seasonal total-to-baseline ratio.
pub fn classify_seasonal_ratio(ratio: f64, thresholds: &Thresholds) -> Option<SeasonalAnomalyKind> {
    if ratio < thresholds.drought_ratio {
        Some(SeasonalAnomalyKind::Drought)
    } else if ratio > thresholds.excess_ratio {
        Some(SeasonalAnomalyKind::Excess)
    } else {
        None
    }
}
