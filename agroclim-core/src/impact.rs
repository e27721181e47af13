//! Economic impact of seasonal rainfall anomalies on major crops.
//!
//! Each complete season-year of a rainfall report is classified as drought,
//! excess or normal from its seasonal anomalies, and a yield factor is
//! applied to the baseline revenue of every crop in [`CROPS`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Region;
use crate::quality::seasons::{Season, complete_season_years};
use crate::quality::{QualityReport, SeasonalAnomalyKind, ValidationStatus};

/// Cultivation figures for one crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Crop {
    /// Crop name
    pub name: &'static str,
    /// Cultivated area in hectares
    pub area_ha: f64,
    /// Market price in INR per quintal
    pub price_inr_per_qtl: f64,
    /// Normal yield in quintals per hectare
    pub yield_qtl_per_ha: f64,
}

impl Crop {
    /// Normal production in quintals.
    pub fn base_yield_qtl(&self) -> f64 {
        self.area_ha * self.yield_qtl_per_ha
    }

    /// Normal revenue in INR.
    pub fn base_revenue_inr(&self) -> f64 {
        self.base_yield_qtl() * self.price_inr_per_qtl
    }
}

/// Major crops of the covered regions.
pub const CROPS: [Crop; 5] = [
    Crop {
        name: "Soybean",
        area_ha: 3_000_000.0,
        price_inr_per_qtl: 4000.0,
        yield_qtl_per_ha: 10.0,
    },
    Crop {
        name: "Cotton",
        area_ha: 2_500_000.0,
        price_inr_per_qtl: 6000.0,
        yield_qtl_per_ha: 8.0,
    },
    Crop {
        name: "Wheat",
        area_ha: 2_000_000.0,
        price_inr_per_qtl: 2500.0,
        yield_qtl_per_ha: 25.0,
    },
    Crop {
        name: "Gram",
        area_ha: 1_500_000.0,
        price_inr_per_qtl: 5000.0,
        yield_qtl_per_ha: 8.0,
    },
    Crop {
        name: "Paddy",
        area_ha: 1_800_000.0,
        price_inr_per_qtl: 2200.0,
        yield_qtl_per_ha: 20.0,
    },
];

/// Rainfall classification of a season-year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonStatus {
    /// Seasonal total below the drought ratio
    Drought,
    /// Seasonal total above the excess ratio
    Excess,
    /// Neither
    Normal,
}

impl SeasonStatus {
    /// Fractional yield change applied to baseline revenue.
    pub fn yield_factor(&self) -> f64 {
        match self {
            SeasonStatus::Drought => -0.20,
            SeasonStatus::Excess => -0.10,
            SeasonStatus::Normal => 0.0,
        }
    }
}

impl From<SeasonalAnomalyKind> for SeasonStatus {
    fn from(kind: SeasonalAnomalyKind) -> Self {
        match kind {
            SeasonalAnomalyKind::Drought => SeasonStatus::Drought,
            SeasonalAnomalyKind::Excess => SeasonStatus::Excess,
        }
    }
}

impl fmt::Display for SeasonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SeasonStatus::Drought => "drought",
            SeasonStatus::Excess => "excess",
            SeasonStatus::Normal => "normal",
        })
    }
}

/// Estimated impact for one crop in one season-year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactRow {
    /// Region
    pub region: Region,
    /// Season-year label
    pub year: i32,
    /// Season
    pub season: Season,
    /// Crop name
    pub crop: String,
    /// Season classification
    pub status: SeasonStatus,
    /// Normal production in quintals
    pub base_yield_qtl: f64,
    /// Normal revenue in INR
    pub base_revenue_inr: f64,
    /// Revenue change in INR; negative for a loss
    pub estimated_loss_inr: f64,
}

/// Computes crop impact rows for every complete season-year of a rainfall
/// report.
///
/// Uncomputable reports have no evaluated seasons and yield no rows.
pub fn economic_impact(region: Region, rainfall_report: &QualityReport) -> Vec<ImpactRow> {
    if rainfall_report.status == ValidationStatus::Uncomputable {
        return Vec::new();
    }

    let mut rows = Vec::new();
    for (year, season) in complete_season_years(rainfall_report.date_range) {
        let status = rainfall_report
            .seasonal_anomalies()
            .find(|(y, s, _)| *y == year && *s == season)
            .map_or(SeasonStatus::Normal, |(_, _, kind)| kind.into());

        for crop in &CROPS {
            let base_revenue_inr = crop.base_revenue_inr();
            rows.push(ImpactRow {
                region,
                year,
                season,
                crop: crop.name.to_string(),
                status,
                base_yield_qtl: crop.base_yield_qtl(),
                base_revenue_inr,
                estimated_loss_inr: status.yield_factor() * base_revenue_inr,
            });
        }
    }
    rows
}

/// Sum of estimated losses across rows.
pub fn total_loss(rows: &[ImpactRow]) -> f64 {
    rows.iter().map(|row| row.estimated_loss_inr).sum()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{DateRange, VariableKind};
    use crate::quality::{
        AnomalyRecord, ContinuityCheck, MissingValuesCheck, QualityChecks, RangeCheck, Statistics,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn report(range: DateRange, anomalies: Vec<AnomalyRecord>) -> QualityReport {
        let checks = QualityChecks {
            missing_values: MissingValuesCheck {
                passed: true,
                ..MissingValuesCheck::default()
            },
            continuity: ContinuityCheck {
                passed: true,
                expected_days: range.expected_days(),
                actual_days: range.expected_days(),
                missing_days: 0,
                missing_dates: vec![],
                duplicate_dates: vec![],
            },
            range: RangeCheck {
                passed: true,
                variable: VariableKind::Rainfall,
                lower_bound: 0.0,
                upper_bound: 150.0,
                min_observed: None,
                max_observed: None,
                out_of_range_dates: vec![],
            },
        };
        let stats = Statistics::compute("mh_precip", &[1.0]).unwrap();
        QualityReport::new("mh_precip", VariableKind::Rainfall, 1, range, checks, stats)
            .with_anomalies(anomalies)
    }

    #[test]
    fn test_crop_baselines() {
        let soybean = CROPS[0];
        assert_eq!(soybean.base_yield_qtl(), 30_000_000.0);
        assert_eq!(soybean.base_revenue_inr(), 120_000_000_000.0);
    }

    #[test]
    fn test_drought_season_applies_twenty_percent() {
        let range = DateRange::new(date(2020, 6, 1), date(2021, 3, 31)).unwrap();
        let drought = AnomalyRecord::SeasonalAnomaly {
            year: 2020,
            season: Season::Kharif,
            kind: SeasonalAnomalyKind::Drought,
            total_mm: 600.0,
            baseline_mm: 900.0,
            ratio_to_mean: 0.667,
        };
        let rows = economic_impact(Region::Maharashtra, &report(range, vec![drought]));

        // Kharif 2020 and Rabi 2020, five crops each
        assert_eq!(rows.len(), 10);
        let kharif_soybean = rows
            .iter()
            .find(|r| r.season == Season::Kharif && r.crop == "Soybean")
            .unwrap();
        assert_eq!(kharif_soybean.status, SeasonStatus::Drought);
        assert_eq!(kharif_soybean.estimated_loss_inr, -24_000_000_000.0);

        let rabi_rows: Vec<&ImpactRow> = rows.iter().filter(|r| r.season == Season::Rabi).collect();
        assert!(rabi_rows.iter().all(|r| r.status == SeasonStatus::Normal));
        assert!(rabi_rows.iter().all(|r| r.estimated_loss_inr == 0.0));
    }

    #[test]
    fn test_excess_factor_and_total() {
        let range = DateRange::new(date(2020, 6, 1), date(2020, 10, 31)).unwrap();
        let excess = AnomalyRecord::SeasonalAnomaly {
            year: 2020,
            season: Season::Kharif,
            kind: SeasonalAnomalyKind::Excess,
            total_mm: 1300.0,
            baseline_mm: 1000.0,
            ratio_to_mean: 1.3,
        };
        let rows = economic_impact(Region::MadhyaPradesh, &report(range, vec![excess]));
        assert_eq!(rows.len(), 5);
        let expected: f64 = CROPS.iter().map(|c| -0.10 * c.base_revenue_inr()).sum();
        assert!((total_loss(&rows) - expected).abs() < 1.0);
        assert!(rows.iter().all(|r| r.region == Region::MadhyaPradesh));
    }

    #[test]
    fn test_uncomputable_report_has_no_rows() {
        let range = DateRange::new(date(2020, 6, 1), date(2020, 10, 31)).unwrap();
        let report =
            QualityReport::uncomputable("mh_precip", VariableKind::Rainfall, 0, range, "empty");
        assert!(economic_impact(Region::Maharashtra, &report).is_empty());
    }
}
