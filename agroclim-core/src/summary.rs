//! Per-dataset summary table.
//!
//! One CSV row per quality report with the headline counts. The same
//! module reads the table back, so a written summary can be re-checked
//! against the reports it came from.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::{AgroclimError, Result};
use crate::models::{DateRange, VariableKind};
use crate::quality::{QualityReport, ValidationStatus};

/// One summary row.
///
/// Check-derived counts are empty for uncomputable datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Dataset name
    pub name: String,
    /// Variable carried by the dataset
    pub variable: VariableKind,
    /// Number of records
    pub total_records: u64,
    /// Declared range as `YYYY-MM-DD to YYYY-MM-DD`
    pub date_range: String,
    /// Overall status
    pub status: ValidationStatus,
    /// Expected minus actual days
    pub missing_days: Option<i64>,
    /// Records without a value
    pub missing_values: Option<u64>,
    /// Dates with out-of-range values
    pub out_of_range: Option<u64>,
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
    /// Drought and excess season-years
    pub seasonal_anomalies: u64,
}

impl SummaryRow {
    /// Summarizes a quality report.
    pub fn from_report(report: &QualityReport) -> Self {
        let counts = report.anomaly_counts();
        let checks = report.checks.as_ref();
        Self {
            name: report.dataset_name.clone(),
            variable: report.variable,
            total_records: report.total_records,
            date_range: report.date_range.to_string(),
            status: report.status,
            missing_days: checks.map(|c| c.continuity.missing_days),
            missing_values: checks.map(|c| c.missing_values.missing_count),
            out_of_range: checks.map(|c| c.range.out_of_range_dates.len() as u64),
            extreme_events: counts.extreme_events,
            dry_spells: counts.dry_spells,
            longest_dry_spell_days: counts.longest_dry_spell_days,
            heat_stress_days: counts.heat_stress_days,
            cold_stress_days: counts.cold_stress_days,
            seasonal_anomalies: counts.seasonal_anomalies(),
        }
    }

    /// Parses the `date_range` column.
    pub fn parsed_date_range(&self) -> Result<DateRange> {
        self.date_range.parse()
    }
}

/// Writes one summary row per report, with a header row.
pub fn write_summary<'a, W, I>(writer: W, reports: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a QualityReport>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for report in reports {
        wtr.serialize(SummaryRow::from_report(report)).map_err(|e| {
            AgroclimError::csv(format!("writing summary row '{}'", report.dataset_name), e)
        })?;
    }
    wtr.flush()
        .map_err(|e| AgroclimError::io("flushing summary", e))?;
    Ok(())
}

/// Renders the summary table as a string.
pub fn summary_to_string<'a, I>(reports: I) -> Result<String>
where
    I: IntoIterator<Item = &'a QualityReport>,
{
    let mut buffer = Vec::new();
    write_summary(&mut buffer, reports)?;
    String::from_utf8(buffer)
        .map_err(|e| AgroclimError::configuration(format!("summary is not valid UTF-8: {}", e)))
}

/// Reads summary rows written by [`write_summary`].
pub fn read_summary<R: Read>(reader: R) -> Result<Vec<SummaryRow>> {
    let mut rdr = csv::Reader::from_reader(reader);
    rdr.deserialize::<SummaryRow>()
        .map(|row| row.map_err(|e| AgroclimError::csv("reading summary", e)))
        .collect()
}
