//! Climate series data models.
//!
//! A [`Dataset`] is one variable for one region: an ordered run of daily
//! [`TimeSeriesRecord`]s plus the date range the source claims to cover.
//! Datasets are immutable once built; every check reads them by reference.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AgroclimError, Result};

/// Date format used for input files and report date ranges.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Separator used when rendering a [`DateRange`] as text.
const RANGE_SEPARATOR: &str = " to ";

/// Measured variable carried by a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    /// Daily rainfall in millimetres
    Rainfall,
    /// Daily mean temperature in degrees Celsius
    Temperature,
}

impl VariableKind {
    /// Returns the lowercase name used in reports and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableKind::Rainfall => "rainfall",
            VariableKind::Temperature => "temperature",
        }
    }

    /// Returns the CSV column holding this variable's values.
    pub fn value_column(&self) -> &'static str {
        match self {
            VariableKind::Rainfall => "rainfall_mm",
            VariableKind::Temperature => "mean",
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariableKind {
    type Err = AgroclimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rainfall" | "precipitation" | "precip" => Ok(VariableKind::Rainfall),
            "temperature" | "temp" => Ok(VariableKind::Temperature),
            other => Err(AgroclimError::configuration(format!(
                "unknown variable kind '{}'",
                other
            ))),
        }
    }
}

/// Indian state covered by the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Maharashtra (MH)
    Maharashtra,
    /// Madhya Pradesh (MP)
    MadhyaPradesh,
}

impl Region {
    /// All regions in report order.
    pub const ALL: [Region; 2] = [Region::Maharashtra, Region::MadhyaPradesh];

    /// Two-letter lowercase code used in dataset names.
    pub fn code(&self) -> &'static str {
        match self {
            Region::Maharashtra => "mh",
            Region::MadhyaPradesh => "mp",
        }
    }

    /// Human-readable state name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Region::Maharashtra => "Maharashtra",
            Region::MadhyaPradesh => "Madhya Pradesh",
        }
    }

    /// Conventional dataset name for this region and variable, e.g. `mh_precip`.
    pub fn dataset_name(&self, kind: VariableKind) -> String {
        let suffix = match kind {
            VariableKind::Rainfall => "precip",
            VariableKind::Temperature => "temp",
        };
        format!("{}_{}", self.code(), suffix)
    }

    /// Conventional input file name, e.g. `MH_precipitation.csv`.
    pub fn file_name(&self, kind: VariableKind) -> String {
        let suffix = match kind {
            VariableKind::Rainfall => "precipitation",
            VariableKind::Temperature => "temperature",
        };
        format!("{}_{}.csv", self.code().to_uppercase(), suffix)
    }

    /// Resolves a region from a dataset name prefix such as `mp_temp`.
    pub fn from_dataset_name(name: &str) -> Option<Region> {
        let prefix = name.split('_').next()?;
        Region::ALL
            .into_iter()
            .find(|region| region.code().eq_ignore_ascii_case(prefix))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the range
    pub start: NaiveDate,
    /// Last day of the range (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting an end date before the start date.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(AgroclimError::configuration(format!(
                "date range end {} precedes start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of calendar days covered: `(end - start).days + 1`.
    pub fn expected_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Returns true if `date` lies within the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Iterates every day in the range, start through end.
    pub fn days(&self) -> DayIter {
        DayIter {
            next: Some(self.start),
            end: self.end,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.start.format(DATE_FORMAT),
            RANGE_SEPARATOR,
            self.end.format(DATE_FORMAT)
        )
    }
}

impl FromStr for DateRange {
    type Err = AgroclimError;

    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = s.split_once(RANGE_SEPARATOR).ok_or_else(|| {
            AgroclimError::configuration(format!("malformed date range '{}'", s))
        })?;
        let parse = |value: &str| {
            NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
                AgroclimError::configuration(format!("invalid date '{}': {}", value.trim(), e))
            })
        };
        DateRange::new(parse(start)?, parse(end)?)
    }
}

/// Iterator over each day of a [`DateRange`].
#[derive(Debug, Clone)]
pub struct DayIter {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for DayIter {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|date| *date <= self.end)?;
        self.next = current.checked_add_days(Days::new(1));
        Some(current)
    }
}

/// A single daily observation.
///
/// `value` is `None` when the source had an empty cell for that day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRecord {
    /// Observation date
    pub date: NaiveDate,
    /// Measured value, absent when the source cell was empty
    pub value: Option<f64>,
}

impl TimeSeriesRecord {
    /// Creates a record with a present value.
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value: Some(value),
        }
    }

    /// Creates a record whose value is missing.
    pub fn missing(date: NaiveDate) -> Self {
        Self { date, value: None }
    }
}

/// A named, date-ordered daily series for one variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    name: String,
    kind: VariableKind,
    range: DateRange,
    records: Vec<TimeSeriesRecord>,
}

impl Dataset {
    /// Builds a dataset, enforcing date order and the declared range.
    ///
    /// Equal consecutive dates are accepted so that the continuity check
    /// can report them as duplicates; decreasing dates are rejected.
    pub fn new(
        name: impl Into<String>,
        kind: VariableKind,
        range: DateRange,
        records: Vec<TimeSeriesRecord>,
    ) -> Result<Self> {
        let name = name.into();

        for pair in records.windows(2) {
            if pair[1].date < pair[0].date {
                return Err(AgroclimError::NonChronological {
                    dataset: name,
                    previous: pair[0].date,
                    current: pair[1].date,
                });
            }
        }

        if let Some(outside) = records.iter().find(|r| !range.contains(r.date)) {
            return Err(AgroclimError::OutOfDeclaredRange {
                dataset: name,
                date: outside.date,
                range: range.to_string(),
            });
        }

        Ok(Self {
            name,
            kind,
            range,
            records,
        })
    }

    /// Builds a dataset whose claimed range spans its first and last record.
    ///
    /// Returns a configuration error for an empty record list, since there is
    /// no range to infer.
    pub fn with_inferred_range(
        name: impl Into<String>,
        kind: VariableKind,
        records: Vec<TimeSeriesRecord>,
    ) -> Result<Self> {
        let name = name.into();
        let (first, last) = match (records.first(), records.last()) {
            (Some(first), Some(last)) => (first.date, last.date),
            _ => {
                return Err(AgroclimError::configuration(format!(
                    "cannot infer a date range for empty dataset '{}'",
                    name
                )));
            }
        };
        let range = DateRange::new(first, last).map_err(|_| AgroclimError::NonChronological {
            dataset: name.clone(),
            previous: first,
            current: last,
        })?;
        Self::new(name, kind, range, records)
    }

    /// Dataset name, e.g. `mh_precip`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variable carried by this dataset.
    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    /// Claimed date range.
    pub fn range(&self) -> DateRange {
        self.range
    }

    /// All records in date order.
    pub fn records(&self) -> &[TimeSeriesRecord] {
        &self.records
    }

    /// Number of records, including those with missing values.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Present values in date order, skipping missing cells.
    pub fn values(&self) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.value).collect()
    }

    /// Region encoded in the dataset name, if it follows the naming convention.
    pub fn region(&self) -> Option<Region> {
        Region::from_dataset_name(&self.name)
    }
}
