//! Regional climate resilience indicators and recommendations.
//!
//! Combines one region's rainfall and temperature series (with their
//! quality reports) into variability, anomaly-frequency and stress
//! indicators, a 0-100 resilience score, and recommendation lists.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::aggregate::{MonthlyAggregate, monthly_aggregates, usable_values};
use crate::impact::ImpactRow;
use crate::models::{Dataset, Region};
use crate::quality::seasons::complete_season_years;
use crate::quality::statistics::{mean, percentile};
use crate::quality::{QualityReport, ValidationStatus};

/// Kharif days are stressed outside this mean temperature band (°C).
const KHARIF_OPTIMAL_TEMP_C: (f64, f64) = (20.0, 30.0);

/// Kharif days with less rain than this (mm) are stressed.
const KHARIF_MIN_RAINFALL_MM: f64 = 5.0;

/// Kharif stress percentage above which crop recommendations apply.
const KHARIF_STRESS_LIMIT_PCT: f64 = 30.0;

/// Infrastructure risk above which infrastructure recommendations apply.
const INFRASTRUCTURE_RISK_LIMIT: f64 = 70.0;

/// Estimated loss (INR) below which economic recommendations apply.
const ECONOMIC_LOSS_LIMIT_INR: f64 = -1_000_000.0;

/// One region's series and reports.
#[derive(Debug, Clone, Copy)]
pub struct RegionSeries<'a> {
    /// Daily rainfall
    pub rainfall: &'a Dataset,
    /// Report for the rainfall dataset
    pub rainfall_report: &'a QualityReport,
    /// Daily mean temperature
    pub temperature: &'a Dataset,
    /// Report for the temperature dataset
    pub temperature_report: &'a QualityReport,
}

/// Resilience indicators for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResilienceIndicators {
    /// Region assessed
    pub region: Region,
    /// Mean monthly coefficient of variation of daily rainfall
    pub rainfall_variability: Option<f64>,
    /// Number of complete season-years evaluated
    pub evaluated_seasons: u64,
    /// Share of evaluated season-years classified drought
    pub drought_frequency: f64,
    /// Share of evaluated season-years classified excess
    pub excess_frequency: f64,
    /// Mean absolute deviation of monthly mean temperature (°C)
    pub temperature_anomaly: Option<f64>,
    /// Share of temperature days flagged as heat stress
    pub heat_stress_share: f64,
    /// Share of temperature days flagged as cold stress
    pub cold_stress_share: f64,
    /// Percentage of Kharif days outside optimal growing conditions
    pub kharif_stress_pct: Option<f64>,
    /// Extreme-month exposure, 0-100
    pub infrastructure_risk: f64,
    /// Rainfall subscore, 0-100
    pub rainfall_score: f64,
    /// Temperature subscore, 0-100
    pub temperature_score: f64,
    /// Overall resilience score, 0-100
    pub resilience_score: f64,
}

/// Recommendations for one region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    /// Strategies chosen by resilience score
    pub climate_adaptation: Vec<String>,
    /// Measures for regions with material crop losses
    pub economic_measures: Vec<String>,
    /// Measures for regions exposed to extreme months
    pub infrastructure: Vec<String>,
    /// Measures for regions with stressed Kharif conditions
    pub crop_management: Vec<String>,
}

/// Computes resilience indicators for one region.
pub fn assess_region(region: Region, series: &RegionSeries<'_>) -> ResilienceIndicators {
    let rain_monthly = monthly_aggregates(series.rainfall, series.rainfall_report);
    let temp_monthly = monthly_aggregates(series.temperature, series.temperature_report);

    let rainfall_variability = {
        let ratios: Vec<f64> = rain_monthly
            .iter()
            .filter_map(MonthlyAggregate::coefficient_of_variation)
            .collect();
        mean(&ratios)
    };

    let evaluated_seasons = if series.rainfall_report.status == ValidationStatus::Uncomputable {
        0
    } else {
        complete_season_years(series.rainfall_report.date_range).len() as u64
    };
    let counts = series.rainfall_report.anomaly_counts();
    let drought_frequency = share(counts.droughts, evaluated_seasons);
    let excess_frequency = share(counts.excess_seasons, evaluated_seasons);

    let temperature_anomaly = temperature_anomaly(&temp_monthly);

    let temp_days = usable_values(series.temperature, series.temperature_report).len() as u64;
    let temp_counts = series.temperature_report.anomaly_counts();
    let heat_stress_share = share(temp_counts.heat_stress_days, temp_days);
    let cold_stress_share = share(temp_counts.cold_stress_days, temp_days);

    let rainfall_score = clamp_score(
        100.0
            - 50.0 * rainfall_variability.unwrap_or(0.0)
            - 100.0 * drought_frequency
            - 75.0 * excess_frequency,
    );
    let temperature_score =
        clamp_score(100.0 - 100.0 * heat_stress_share - 75.0 * cold_stress_share);

    let indicators = ResilienceIndicators {
        region,
        rainfall_variability,
        evaluated_seasons,
        drought_frequency,
        excess_frequency,
        temperature_anomaly,
        heat_stress_share,
        cold_stress_share,
        kharif_stress_pct: kharif_stress_pct(series),
        infrastructure_risk: infrastructure_risk(&rain_monthly, &temp_monthly),
        rainfall_score,
        temperature_score,
        resilience_score: (rainfall_score + temperature_score) / 2.0,
    };

    tracing::info!(
        region = %region,
        score = indicators.resilience_score,
        "Resilience assessed"
    );

    indicators
}

/// Adaptation strategies for a resilience score.
pub fn adaptation_strategies(score: f64) -> Vec<String> {
    let strategies: [&str; 3] = if score < 30.0 {
        [
            "Implement comprehensive drought management plan",
            "Invest in climate-resistant crop varieties",
            "Develop water storage infrastructure",
        ]
    } else if score < 60.0 {
        [
            "Improve irrigation efficiency",
            "Implement soil moisture conservation",
            "Diversify crop portfolio",
        ]
    } else {
        [
            "Maintain current resilience measures",
            "Monitor climate patterns",
            "Plan for future climate scenarios",
        ]
    };
    strategies.iter().map(ToString::to_string).collect()
}

/// Builds the recommendation lists for a region.
///
/// `impact` may hold rows for several regions; only this region's rows are
/// considered.
pub fn recommend(indicators: &ResilienceIndicators, impact: &[ImpactRow]) -> Recommendations {
    let mut recommendations = Recommendations {
        climate_adaptation: adaptation_strategies(indicators.resilience_score),
        ..Recommendations::default()
    };

    let material_loss = impact.iter().any(|row| {
        row.region == indicators.region && row.estimated_loss_inr < ECONOMIC_LOSS_LIMIT_INR
    });
    if material_loss {
        recommendations.economic_measures = to_strings(&[
            "Implement crop insurance schemes",
            "Develop alternative income sources",
            "Establish market linkages for crop diversification",
        ]);
    }

    if indicators.infrastructure_risk > INFRASTRUCTURE_RISK_LIMIT {
        recommendations.infrastructure = to_strings(&[
            "Upgrade irrigation infrastructure",
            "Improve water storage facilities",
            "Enhance weather monitoring systems",
        ]);
    }

    if indicators
        .kharif_stress_pct
        .is_some_and(|pct| pct > KHARIF_STRESS_LIMIT_PCT)
    {
        recommendations.crop_management = to_strings(&[
            "Introduce drought-resistant varieties",
            "Consider shifting kharif sowing dates",
            "Implement soil moisture conservation practices",
        ]);
    }

    recommendations
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn share(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

fn temperature_anomaly(monthly: &[MonthlyAggregate]) -> Option<f64> {
    let means: Vec<f64> = monthly.iter().map(|m| m.mean).collect();
    let overall = mean(&means)?;
    let deviations: Vec<f64> = means.iter().map(|m| (m - overall).abs()).collect();
    mean(&deviations)
}

/// Share of Kharif days where temperature is outside the optimal band or
/// rainfall is short, as a percentage. Only days with usable values in both
/// series count.
fn kharif_stress_pct(series: &RegionSeries<'_>) -> Option<f64> {
    let is_kharif = |date: &NaiveDate| (6..=10).contains(&date.month());

    let rainfall: BTreeMap<NaiveDate, f64> = usable_values(series.rainfall, series.rainfall_report)
        .into_iter()
        .filter(|(date, _)| is_kharif(date))
        .collect();

    let mut days = 0u64;
    let mut stressed = 0u64;
    for (date, temp) in usable_values(series.temperature, series.temperature_report) {
        let Some(rain) = rainfall.get(&date) else {
            continue;
        };
        days += 1;
        let (low, high) = KHARIF_OPTIMAL_TEMP_C;
        if temp < low || temp > high || *rain < KHARIF_MIN_RAINFALL_MM {
            stressed += 1;
        }
    }

    (days > 0).then(|| share(stressed, days) * 100.0)
}

/// Average share of months above their series' 95th percentile (rainfall
/// totals and mean temperatures), scaled to 0-100.
fn infrastructure_risk(rainfall: &[MonthlyAggregate], temperature: &[MonthlyAggregate]) -> f64 {
    let extreme_share = |values: Vec<f64>| -> f64 {
        let Some(threshold) = percentile(&values, 0.95) else {
            return 0.0;
        };
        let above = values.iter().filter(|v| **v > threshold).count() as u64;
        share(above, values.len() as u64)
    };

    let rain = extreme_share(rainfall.iter().map(|m| m.total).collect());
    let temp = extreme_share(temperature.iter().map(|m| m.mean).collect());
    clamp_score(50.0 * rain + 50.0 * temp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact::SeasonStatus;
    use crate::models::{DateRange, TimeSeriesRecord, VariableKind};
    use crate::quality::QualityAnalyzer;
    use crate::quality::seasons::Season;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series_from(
        name: &str,
        kind: VariableKind,
        range: DateRange,
        value: impl Fn(NaiveDate) -> f64,
    ) -> Dataset {
        let records = range
            .days()
            .map(|day| TimeSeriesRecord::new(day, value(day)))
            .collect();
        Dataset::new(name, kind, range, records).unwrap()
    }

    #[test]
    fn test_adaptation_strategies_by_score() {
        assert_eq!(
            adaptation_strategies(10.0)[0],
            "Implement comprehensive drought management plan"
        );
        assert_eq!(adaptation_strategies(45.0)[0], "Improve irrigation efficiency");
        assert_eq!(
            adaptation_strategies(60.0)[0],
            "Maintain current resilience measures"
        );
        assert_eq!(adaptation_strategies(99.0).len(), 3);
    }

    #[test]
    fn test_steady_climate_scores_high() {
        let range = DateRange::new(date(2020, 6, 1), date(2020, 10, 31)).unwrap();
        let rainfall = series_from("mh_precip", VariableKind::Rainfall, range, |_| 8.0);
        let temperature = series_from("mh_temp", VariableKind::Temperature, range, |_| 25.0);

        let analyzer = QualityAnalyzer::with_defaults();
        let rain_report = analyzer.analyze(&rainfall).unwrap();
        let temp_report = analyzer.analyze(&temperature).unwrap();
        let series = RegionSeries {
            rainfall: &rainfall,
            rainfall_report: &rain_report,
            temperature: &temperature,
            temperature_report: &temp_report,
        };

        let indicators = assess_region(Region::Maharashtra, &series);
        assert_eq!(indicators.rainfall_variability, Some(0.0));
        assert_eq!(indicators.evaluated_seasons, 1);
        assert_eq!(indicators.drought_frequency, 0.0);
        assert_eq!(indicators.temperature_anomaly, Some(0.0));
        assert_eq!(indicators.heat_stress_share, 0.0);
        assert_eq!(indicators.kharif_stress_pct, Some(0.0));
        assert_eq!(indicators.infrastructure_risk, 0.0);
        assert_eq!(indicators.resilience_score, 100.0);

        let recommendations = recommend(&indicators, &[]);
        assert_eq!(
            recommendations.climate_adaptation[0],
            "Maintain current resilience measures"
        );
        assert!(recommendations.economic_measures.is_empty());
        assert!(recommendations.crop_management.is_empty());
    }

    #[test]
    fn test_hot_dry_kharif_is_stressed() {
        let range = DateRange::new(date(2020, 6, 1), date(2020, 10, 31)).unwrap();
        let rainfall = series_from("mp_precip", VariableKind::Rainfall, range, |_| 2.0);
        let temperature = series_from("mp_temp", VariableKind::Temperature, range, |d| {
            if d.month() <= 7 { 38.0 } else { 25.0 }
        });

        let analyzer = QualityAnalyzer::with_defaults();
        let rain_report = analyzer.analyze(&rainfall).unwrap();
        let temp_report = analyzer.analyze(&temperature).unwrap();
        let series = RegionSeries {
            rainfall: &rainfall,
            rainfall_report: &rain_report,
            temperature: &temperature,
            temperature_report: &temp_report,
        };

        let indicators = assess_region(Region::MadhyaPradesh, &series);
        assert_eq!(indicators.kharif_stress_pct, Some(100.0));
        // June and July are heat-stress days: 61 of 153
        assert!((indicators.heat_stress_share - 61.0 / 153.0).abs() < 1e-12);
        assert!(indicators.temperature_score < 100.0);

        let recommendations = recommend(&indicators, &[]);
        assert_eq!(recommendations.crop_management.len(), 3);
    }

    #[test]
    fn test_economic_measures_follow_region_losses() {
        let indicators = ResilienceIndicators {
            region: Region::Maharashtra,
            rainfall_variability: None,
            evaluated_seasons: 0,
            drought_frequency: 0.0,
            excess_frequency: 0.0,
            temperature_anomaly: None,
            heat_stress_share: 0.0,
            cold_stress_share: 0.0,
            kharif_stress_pct: None,
            infrastructure_risk: 80.0,
            rainfall_score: 100.0,
            temperature_score: 100.0,
            resilience_score: 100.0,
        };
        let loss = ImpactRow {
            region: Region::MadhyaPradesh,
            year: 2020,
            season: Season::Kharif,
            crop: "Soybean".to_string(),
            status: SeasonStatus::Drought,
            base_yield_qtl: 1.0,
            base_revenue_inr: 1.0,
            estimated_loss_inr: -5_000_000.0,
        };

        let recommendations = recommend(&indicators, std::slice::from_ref(&loss));
        assert!(recommendations.economic_measures.is_empty());
        assert_eq!(recommendations.infrastructure.len(), 3);

        let own_loss = ImpactRow {
            region: Region::Maharashtra,
            ..loss
        };
        let recommendations = recommend(&indicators, &[own_loss]);
        assert_eq!(recommendations.economic_measures.len(), 3);
    }

    #[test]
    fn test_scores_are_clamped() {
        assert_eq!(clamp_score(-40.0), 0.0);
        assert_eq!(clamp_score(140.0), 100.0);
        assert_eq!(share(1, 0), 0.0);
    }
}
