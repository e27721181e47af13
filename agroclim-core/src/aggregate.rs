//! Monthly and seasonal aggregation of validated series.
//!
//! Only values that are present and passed the range check feed the
//! aggregates, so a report must be produced before a dataset is
//! aggregated.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AgroclimError, Result};
use crate::models::{Dataset, VariableKind};
use crate::quality::QualityReport;
use crate::quality::seasons::{Season, seasonal_totals};
use crate::quality::statistics::{mean, sample_std_dev};

/// Aggregate of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    /// Calendar year
    pub year: i32,
    /// Month number, 1-12
    pub month: u32,
    /// Number of values aggregated
    pub days: u32,
    /// Sum of the values
    pub total: f64,
    /// Mean daily value
    pub mean: f64,
    /// Sample standard deviation of the daily values, if at least two
    pub std_dev: Option<f64>,
}

impl MonthlyAggregate {
    /// Coefficient of variation of the daily values, `None` when the mean
    /// is zero or the deviation is undefined.
    pub fn coefficient_of_variation(&self) -> Option<f64> {
        let std_dev = self.std_dev?;
        if self.mean.abs() < f64::EPSILON {
            None
        } else {
            Some(std_dev / self.mean)
        }
    }
}

/// Aggregate of one complete season-year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalAggregate {
    /// Season-year label
    pub year: i32,
    /// Season
    pub season: Season,
    /// Number of values aggregated
    pub days: u32,
    /// Sum of the values
    pub total: f64,
    /// Mean daily value, absent for a season with no usable values
    pub mean: Option<f64>,
}

/// All aggregates for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetAggregates {
    /// Dataset name
    pub dataset_name: String,
    /// Variable carried by the dataset
    pub variable: VariableKind,
    /// Monthly aggregates in chronological order
    pub monthly: Vec<MonthlyAggregate>,
    /// Seasonal aggregates in chronological order
    pub seasonal: Vec<SeasonalAggregate>,
}

impl DatasetAggregates {
    /// Renders the monthly aggregates as CSV with a header row.
    pub fn monthly_csv(&self) -> Result<String> {
        rows_to_csv(&self.monthly, &format!("monthly aggregates of '{}'", self.dataset_name))
    }

    /// Renders the seasonal aggregates as CSV with a header row.
    pub fn seasonal_csv(&self) -> Result<String> {
        rows_to_csv(&self.seasonal, &format!("seasonal aggregates of '{}'", self.dataset_name))
    }
}

// Absent optional fields become empty cells.
fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T], context: &str) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)
            .map_err(|e| AgroclimError::csv(format!("writing {}", context), e))?;
    }
    wtr.flush()
        .map_err(|e| AgroclimError::io(format!("flushing {}", context), e))?;
    Ok(())
}

fn rows_to_csv<T: Serialize>(rows: &[T], context: &str) -> Result<String> {
    let mut buffer = Vec::new();
    write_rows(&mut buffer, rows, context)?;
    String::from_utf8(buffer).map_err(|e| {
        AgroclimError::configuration(format!("{} is not valid UTF-8: {}", context, e))
    })
}

/// Present values of `dataset` that passed the range check in `report`.
pub fn usable_values(dataset: &Dataset, report: &QualityReport) -> Vec<(NaiveDate, f64)> {
    if report.dataset_name != dataset.name() {
        tracing::warn!(
            "Aggregating dataset '{}' with the report for '{}'",
            dataset.name(),
            report.dataset_name
        );
    }
    dataset
        .records()
        .iter()
        .filter_map(|record| Some((record.date, record.value?)))
        .filter(|(date, _)| report.is_in_range(*date))
        .collect()
}

/// Groups usable values by calendar month.
pub fn monthly_aggregates(dataset: &Dataset, report: &QualityReport) -> Vec<MonthlyAggregate> {
    let mut months: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();
    for (date, value) in usable_values(dataset, report) {
        months
            .entry((date.year(), date.month()))
            .or_default()
            .push(value);
    }

    months
        .into_iter()
        .filter_map(|((year, month), values)| {
            Some(MonthlyAggregate {
                year,
                month,
                days: u32::try_from(values.len()).unwrap_or(u32::MAX),
                total: values.iter().sum(),
                mean: mean(&values)?,
                std_dev: sample_std_dev(&values),
            })
        })
        .collect()
}

/// Sums usable values into each complete season-year of the dataset's range.
pub fn seasonal_aggregates(dataset: &Dataset, report: &QualityReport) -> Vec<SeasonalAggregate> {
    seasonal_totals(dataset.range(), usable_values(dataset, report))
        .into_iter()
        .map(|total| SeasonalAggregate {
            year: total.year,
            season: total.season,
            days: total.days,
            total: total.total_mm,
            mean: total.mean_mm(),
        })
        .collect()
}

/// Builds monthly and seasonal aggregates for a dataset.
pub fn aggregate(dataset: &Dataset, report: &QualityReport) -> DatasetAggregates {
    DatasetAggregates {
        dataset_name: dataset.name().to_string(),
        variable: dataset.kind(),
        monthly: monthly_aggregates(dataset, report),
        seasonal: seasonal_aggregates(dataset, report),
    }
}
