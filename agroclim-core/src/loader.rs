//! CSV loading for daily climate series.
//!
//! Each input file has a header row with a `date` column (`YYYY-MM-DD`) and
//! one value column: `rainfall_mm` for rainfall, `mean` for temperature.
//! Other columns are ignored. An empty value cell becomes a missing value;
//! anything else that does not parse is rejected with its line number.
//!
//! # Example CSV
//! ```text
//! date,rainfall_mm
//! 2014-01-01,0.0
//! 2014-01-02,
//! 2014-01-03,12.4
//! ```

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};

use crate::error::{AgroclimError, Result};
use crate::models::{DATE_FORMAT, Dataset, DateRange, Region, TimeSeriesRecord, VariableKind};

/// Name of the date column in every input file.
pub const DATE_COLUMN: &str = "date";

/// Describes one file to load.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSource {
    /// Dataset name, e.g. `mh_precip`
    pub name: String,
    /// Variable carried by the file
    pub kind: VariableKind,
    /// Claimed range; inferred from the first and last record when `None`
    pub range: Option<DateRange>,
}

impl DatasetSource {
    /// Creates a source with an inferred range.
    pub fn new(name: impl Into<String>, kind: VariableKind) -> Self {
        Self {
            name: name.into(),
            kind,
            range: None,
        }
    }

    /// Builder method to set the claimed range.
    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Source for a region's standard dataset.
    pub fn for_region(region: Region, kind: VariableKind) -> Self {
        Self::new(region.dataset_name(kind), kind)
    }
}

/// Parses CSV text into a dataset.
///
/// `context` names the input in error messages, usually the file path.
pub fn parse_str(csv_data: &str, source: &DatasetSource, context: &str) -> Result<Dataset> {
    parse_reader(csv_data.as_bytes(), source, context)
}

/// Parses CSV from any reader into a dataset.
pub fn parse_reader<R: Read>(reader: R, source: &DatasetSource, context: &str) -> Result<Dataset> {
    let records = read_records(reader, source.kind, context)?;
    match source.range {
        Some(range) => Dataset::new(source.name.clone(), source.kind, range, records),
        None => Dataset::with_inferred_range(source.name.clone(), source.kind, records),
    }
}

/// Parses CSV rows into records without building a dataset.
pub fn read_records<R: Read>(
    reader: R,
    kind: VariableKind,
    context: &str,
) -> Result<Vec<TimeSeriesRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| AgroclimError::csv(format!("reading header of {}", context), e))?
        .clone();
    let date_idx = column_index(&headers, DATE_COLUMN, context)?;
    let value_idx = column_index(&headers, kind.value_column(), context)?;

    let mut records = Vec::new();
    let mut missing = 0u64;
    for result in rdr.records() {
        let row = result.map_err(|e| AgroclimError::csv(format!("reading {}", context), e))?;
        let line = row.position().map_or(0, csv::Position::line);

        let date_text = row.get(date_idx).unwrap_or("");
        let date = NaiveDate::parse_from_str(date_text, DATE_FORMAT).map_err(|e| {
            AgroclimError::parse(context, line, format!("invalid date '{}': {}", date_text, e))
        })?;

        let value_text = row.get(value_idx).unwrap_or("");
        let value = parse_value(value_text, context, line)?;
        if value.is_none() {
            missing += 1;
        }
        records.push(TimeSeriesRecord { date, value });
    }

    tracing::debug!(
        "Loaded {} records ({} missing values) from {}",
        records.len(),
        missing,
        context
    );
    Ok(records)
}

/// Builds datasets for a batch of parsed sources.
///
/// Sources with a claimed range keep it. Other non-empty sources get the
/// span of their own records. An empty source without a claimed range
/// borrows the span covered by the rest of the batch, so it still reaches
/// validation and is reported as uncomputable.
///
/// # Errors
/// Fails on ordering or range violations, or when an empty source has no
/// sibling with records to take a range from.
pub fn assemble_batch(parsed: Vec<(DatasetSource, Vec<TimeSeriesRecord>)>) -> Result<Vec<Dataset>> {
    let batch_span = parsed
        .iter()
        .filter_map(|(source, records)| match source.range {
            Some(range) => Some((range.start, range.end)),
            None => Some((records.first()?.date, records.last()?.date)),
        })
        .reduce(|(start, end), (first, last)| (start.min(first), end.max(last)));

    parsed
        .into_iter()
        .map(|(source, records)| match (source.range, records.is_empty(), batch_span) {
            (Some(range), _, _) => Dataset::new(source.name, source.kind, range, records),
            (None, true, Some((start, end))) => {
                let range = DateRange::new(start, end)?;
                tracing::warn!(
                    "Dataset '{}' has no records; using batch range {}",
                    source.name,
                    range
                );
                Dataset::new(source.name, source.kind, range, records)
            }
            (None, _, _) => Dataset::with_inferred_range(source.name, source.kind, records),
        })
        .collect()
}

/// Loads the four standard region files (`MH_precipitation.csv`,
/// `MH_temperature.csv`, `MP_precipitation.csv`, `MP_temperature.csv`)
/// from `dir`.
///
/// When `range` is given it is claimed for every dataset; otherwise ranges
/// are inferred as described in [`assemble_batch`].
pub fn load_region_datasets(dir: &Path, range: Option<DateRange>) -> Result<Vec<Dataset>> {
    let mut parsed = Vec::with_capacity(4);
    for (file_name, source) in standard_sources(range) {
        let path = dir.join(file_name);
        let context = path.display().to_string();
        let text = std::fs::read_to_string(&path)
            .map_err(|e| AgroclimError::io(format!("reading {}", context), e))?;
        let records = read_records(text.as_bytes(), source.kind, &context)?;
        parsed.push((source, records));
    }
    assemble_batch(parsed)
}

/// File names and sources for the standard region datasets, in load order.
pub fn standard_sources(range: Option<DateRange>) -> Vec<(String, DatasetSource)> {
    let mut sources = Vec::with_capacity(4);
    for region in Region::ALL {
        for kind in [VariableKind::Rainfall, VariableKind::Temperature] {
            let mut source = DatasetSource::for_region(region, kind);
            source.range = range;
            sources.push((region.file_name(kind), source));
        }
    }
    sources
}

fn column_index(headers: &StringRecord, column: &str, context: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(column))
        .ok_or_else(|| {
            AgroclimError::parse(context, 1, format!("missing required column '{}'", column))
        })
}

fn parse_value(text: &str, context: &str, line: u64) -> Result<Option<f64>> {
    if text.is_empty() {
        return Ok(None);
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(AgroclimError::parse(
            context,
            line,
            format!("non-numeric value '{}'", text),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rainfall_source() -> DatasetSource {
        DatasetSource::new("mh_precip", VariableKind::Rainfall)
    }

    #[test]
    fn test_parse_rainfall_with_missing_cell() {
        let csv = "date,rainfall_mm\n2014-01-01,0.0\n2014-01-02,\n2014-01-03,12.4\n";
        let dataset = parse_str(csv, &rainfall_source(), "test").unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.records()[1].value, None);
        assert_eq!(dataset.values(), vec![0.0, 12.4]);
        assert_eq!(dataset.range().expected_days(), 3);
    }

    #[test]
    fn test_parse_temperature_ignores_extra_columns() {
        let csv = "date,min,mean,max\n2020-05-01,24.0,31.5,39.0\n2020-05-02,25.1,32.0,40.2\n";
        let source = DatasetSource::new("mp_temp", VariableKind::Temperature);
        let dataset = parse_str(csv, &source, "test").unwrap();

        assert_eq!(dataset.values(), vec![31.5, 32.0]);
        assert_eq!(dataset.kind(), VariableKind::Temperature);
    }

    #[test]
    fn test_missing_value_column() {
        let csv = "date,value\n2020-01-01,1.0\n";
        let err = parse_str(csv, &rainfall_source(), "MH_precipitation.csv").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("rainfall_mm"));
        assert!(message.contains("MH_precipitation.csv"));
    }

    #[test]
    fn test_non_numeric_value_reports_line() {
        let csv = "date,rainfall_mm\n2020-01-01,1.0\n2020-01-02,abc\n";
        let err = parse_str(csv, &rainfall_source(), "test").unwrap_err();
        assert!(matches!(err, AgroclimError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let csv = "date,rainfall_mm\n2020-01-01,NaN\n";
        assert!(parse_str(csv, &rainfall_source(), "test").is_err());
    }

    #[test]
    fn test_bad_date_rejected() {
        let csv = "date,rainfall_mm\n01/02/2020,1.0\n";
        let err = parse_str(csv, &rainfall_source(), "test").unwrap_err();
        assert!(matches!(err, AgroclimError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_non_chronological_rejected() {
        let csv = "date,rainfall_mm\n2020-01-02,1.0\n2020-01-01,1.0\n";
        let err = parse_str(csv, &rainfall_source(), "test").unwrap_err();
        assert!(matches!(err, AgroclimError::NonChronological { .. }));
    }

    #[test]
    fn test_claimed_range_is_kept() {
        let csv = "date,rainfall_mm\n2020-01-02,1.0\n";
        let range: DateRange = "2020-01-01 to 2020-01-10".parse().unwrap();
        let dataset = parse_str(csv, &rainfall_source().with_range(range), "test").unwrap();
        assert_eq!(dataset.range(), range);

        let narrow: DateRange = "2020-01-05 to 2020-01-10".parse().unwrap();
        let err = parse_str(csv, &rainfall_source().with_range(narrow), "test").unwrap_err();
        assert!(matches!(err, AgroclimError::OutOfDeclaredRange { .. }));
    }

    #[test]
    fn test_standard_sources() {
        let sources = standard_sources(None);
        let names: Vec<&str> = sources.iter().map(|(_, s)| s.name.as_str()).collect();
        assert_eq!(names, vec!["mh_precip", "mh_temp", "mp_precip", "mp_temp"]);
        assert_eq!(sources[0].0, "MH_precipitation.csv");
        assert_eq!(sources[3].0, "MP_temperature.csv");
    }

    #[test]
    fn test_load_region_datasets_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        for (file_name, source) in standard_sources(None) {
            let body = match source.kind {
                VariableKind::Rainfall => "date,rainfall_mm\n2020-01-01,1.0\n2020-01-02,0.0\n",
                VariableKind::Temperature => "date,mean\n2020-01-01,21.0\n2020-01-02,22.0\n",
            };
            std::fs::write(dir.path().join(file_name), body).unwrap();
        }

        let datasets = load_region_datasets(dir.path(), None).unwrap();
        assert_eq!(datasets.len(), 4);
        assert_eq!(datasets[1].name(), "mh_temp");
        assert_eq!(datasets[1].values(), vec![21.0, 22.0]);
    }

    #[test]
    fn test_empty_file_borrows_batch_range() {
        let dir = tempfile::tempdir().unwrap();
        for (file_name, source) in standard_sources(None) {
            let rows = match source.name.as_str() {
                "mp_temp" => "",
                "mh_precip" => "2020-01-02,1.0\n2020-01-05,0.0\n",
                _ => "2020-01-01,1.0\n2020-01-03,2.0\n",
            };
            let body = format!("date,{}\n{}", source.kind.value_column(), rows);
            std::fs::write(dir.path().join(file_name), body).unwrap();
        }

        let datasets = load_region_datasets(dir.path(), None).unwrap();
        assert_eq!(datasets.len(), 4);
        let mp_temp = &datasets[3];
        assert_eq!(mp_temp.name(), "mp_temp");
        assert!(mp_temp.is_empty());
        assert_eq!(mp_temp.range().to_string(), "2020-01-01 to 2020-01-05");
        // Non-empty datasets keep their own span
        assert_eq!(datasets[0].range().to_string(), "2020-01-02 to 2020-01-05");
    }

    #[test]
    fn test_all_empty_batch_cannot_infer_range() {
        let parsed = vec![
            (rainfall_source(), Vec::new()),
            (DatasetSource::new("mh_temp", VariableKind::Temperature), Vec::new()),
        ];
        let err = assemble_batch(parsed).unwrap_err();
        assert!(matches!(err, AgroclimError::Configuration { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_region_datasets(dir.path(), None).unwrap_err();
        assert!(matches!(err, AgroclimError::Io { .. }));
    }
}
