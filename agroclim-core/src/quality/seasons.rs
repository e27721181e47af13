//! Agricultural seasonal calendar.
//!
//! Kharif runs June through October of year Y. Rabi runs November of Y
//! through March of Y+1 and is labeled Y. April and May belong to neither
//! season. A season-year is only evaluated when it lies entirely inside a
//! dataset's declared range.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::AgroclimError;
use crate::models::DateRange;

/// Cropping season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    /// Monsoon season, June to October
    Kharif,
    /// Winter season, November to March
    Rabi,
}

impl Season {
    /// All seasons in calendar order within a season-year.
    pub const ALL: [Season; 2] = [Season::Kharif, Season::Rabi];

    /// Returns the lowercase season name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Kharif => "kharif",
            Season::Rabi => "rabi",
        }
    }

    /// First day of this season for season-year `year`.
    ///
    /// Years outside chrono's representable range fall back to
    /// `NaiveDate::MIN`; no dataset can contain such dates.
    pub fn start_date(&self, year: i32) -> NaiveDate {
        let month = match self {
            Season::Kharif => 6,
            Season::Rabi => 11,
        };
        NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of this season for season-year `year`.
    pub fn end_date(&self, year: i32) -> NaiveDate {
        let end = match self {
            Season::Kharif => NaiveDate::from_ymd_opt(year, 10, 31),
            Season::Rabi => year
                .checked_add(1)
                .and_then(|next| NaiveDate::from_ymd_opt(next, 3, 31)),
        };
        end.unwrap_or(NaiveDate::MAX)
    }

    /// Season-year and season containing `date`, or `None` for April and May.
    pub fn of(date: NaiveDate) -> Option<(i32, Season)> {
        match date.month() {
            6..=10 => Some((date.year(), Season::Kharif)),
            11 | 12 => Some((date.year(), Season::Rabi)),
            1..=3 => Some((date.year() - 1, Season::Rabi)),
            _ => None,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = AgroclimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kharif" => Ok(Season::Kharif),
            "rabi" => Ok(Season::Rabi),
            other => Err(AgroclimError::configuration(format!(
                "unknown season '{}'",
                other
            ))),
        }
    }
}

/// Season-years lying entirely within `range`, in chronological order.
pub fn complete_season_years(range: DateRange) -> Vec<(i32, Season)> {
    let mut seasons = Vec::new();
    for year in (range.start.year() - 1)..=range.end.year() {
        for season in Season::ALL {
            if range.start <= season.start_date(year) && season.end_date(year) <= range.end {
                seasons.push((year, season));
            }
        }
    }
    seasons
}

/// Rainfall accumulated over one season-year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalTotal {
    /// Season-year label
    pub year: i32,
    /// Season
    pub season: Season,
    /// Number of values summed
    pub days: u32,
    /// Sum of the values
    pub total_mm: f64,
}

impl SeasonalTotal {
    /// Mean daily value, `None` when nothing was summed.
    pub fn mean_mm(&self) -> Option<f64> {
        if self.days == 0 {
            None
        } else {
            Some(self.total_mm / f64::from(self.days))
        }
    }
}

/// Sums `values` into every complete season-year of `range`.
///
/// Season-years with no values still appear with a zero total. Values
/// dated outside a complete season-year are ignored.
pub fn seasonal_totals<I>(range: DateRange, values: I) -> Vec<SeasonalTotal>
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    let mut buckets: BTreeMap<(i32, Season), SeasonalTotal> = complete_season_years(range)
        .into_iter()
        .map(|(year, season)| {
            (
                (year, season),
                SeasonalTotal {
                    year,
                    season,
                    days: 0,
                    total_mm: 0.0,
                },
            )
        })
        .collect();

    for (date, value) in values {
        let Some(key) = Season::of(date) else {
            continue;
        };
        if let Some(bucket) = buckets.get_mut(&key) {
            bucket.days += 1;
            bucket.total_mm += value;
        }
    }

    // (year, Kharif) < (year, Rabi) < (year + 1, Kharif) matches start-date order.
    buckets.into_values().collect()
}

/// Reference against which seasonal totals are compared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SeasonalBaseline {
    /// Mean of the evaluated season-years themselves
    #[default]
    InSample,
    /// Long-term per-season means supplied by the caller
    Fixed { kharif_mm: f64, rabi_mm: f64 },
}

impl SeasonalBaseline {
    /// Baseline total for `season`, given the evaluated totals.
    ///
    /// Returns `None` when the in-sample baseline has no season-years to
    /// average.
    pub fn baseline_for(&self, season: Season, totals: &[SeasonalTotal]) -> Option<f64> {
        match self {
            SeasonalBaseline::InSample => {
                let season_totals: Vec<f64> = totals
                    .iter()
                    .filter(|t| t.season == season)
                    .map(|t| t.total_mm)
                    .collect();
                super::statistics::mean(&season_totals)
            }
            SeasonalBaseline::Fixed { kharif_mm, rabi_mm } => Some(match season {
                Season::Kharif => *kharif_mm,
                Season::Rabi => *rabi_mm,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_season_of() {
        assert_eq!(Season::of(date(2020, 6, 1)), Some((2020, Season::Kharif)));
        assert_eq!(Season::of(date(2020, 10, 31)), Some((2020, Season::Kharif)));
        assert_eq!(Season::of(date(2020, 11, 1)), Some((2020, Season::Rabi)));
        assert_eq!(Season::of(date(2021, 3, 31)), Some((2020, Season::Rabi)));
        assert_eq!(Season::of(date(2021, 4, 15)), None);
        assert_eq!(Season::of(date(2021, 5, 31)), None);
    }

    #[test]
    fn test_season_bounds() {
        assert_eq!(Season::Kharif.start_date(2019), date(2019, 6, 1));
        assert_eq!(Season::Kharif.end_date(2019), date(2019, 10, 31));
        assert_eq!(Season::Rabi.start_date(2019), date(2019, 11, 1));
        assert_eq!(Season::Rabi.end_date(2019), date(2020, 3, 31));
    }

    #[test]
    fn test_complete_season_years_full_decade() {
        let range = DateRange::new(date(2014, 1, 1), date(2023, 12, 31)).unwrap();
        let seasons = complete_season_years(range);

        let kharif = seasons.iter().filter(|(_, s)| *s == Season::Kharif).count();
        let rabi = seasons.iter().filter(|(_, s)| *s == Season::Rabi).count();
        assert_eq!(kharif, 10);
        // Rabi 2023 runs into 2024 and Rabi 2013 starts in 2013.
        assert_eq!(rabi, 9);
        assert_eq!(seasons.first(), Some(&(2014, Season::Kharif)));
        assert_eq!(seasons.last(), Some(&(2023, Season::Kharif)));
    }

    #[test]
    fn test_complete_season_years_partial_range() {
        let range = DateRange::new(date(2020, 7, 1), date(2021, 3, 31)).unwrap();
        assert_eq!(complete_season_years(range), vec![(2020, Season::Rabi)]);

        let short = DateRange::new(date(2020, 1, 1), date(2020, 5, 31)).unwrap();
        assert!(complete_season_years(short).is_empty());
    }

    #[test]
    fn test_seasonal_totals() {
        let range = DateRange::new(date(2020, 6, 1), date(2021, 3, 31)).unwrap();
        let values = vec![
            (date(2020, 6, 10), 10.0),
            (date(2020, 9, 1), 5.5),
            (date(2020, 12, 25), 2.0),
            (date(2021, 2, 1), 1.0),
        ];
        let totals = seasonal_totals(range, values);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].season, Season::Kharif);
        assert_eq!(totals[0].days, 2);
        assert_eq!(totals[0].total_mm, 15.5);
        assert_eq!(totals[1].season, Season::Rabi);
        assert_eq!(totals[1].year, 2020);
        assert_eq!(totals[1].total_mm, 3.0);
        assert_eq!(totals[1].mean_mm(), Some(1.5));
    }

    #[test]
    fn test_empty_season_has_zero_total() {
        let range = DateRange::new(date(2020, 6, 1), date(2020, 10, 31)).unwrap();
        let totals = seasonal_totals(range, Vec::new());
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].total_mm, 0.0);
        assert_eq!(totals[0].mean_mm(), None);
    }

    #[test]
    fn test_baseline_in_sample_and_fixed() {
        let totals = vec![
            SeasonalTotal {
                year: 2020,
                season: Season::Kharif,
                days: 1,
                total_mm: 80.0,
            },
            SeasonalTotal {
                year: 2021,
                season: Season::Kharif,
                days: 1,
                total_mm: 120.0,
            },
        ];
        let in_sample = SeasonalBaseline::InSample;
        assert_eq!(in_sample.baseline_for(Season::Kharif, &totals), Some(100.0));
        assert_eq!(in_sample.baseline_for(Season::Rabi, &totals), None);

        let fixed = SeasonalBaseline::Fixed {
            kharif_mm: 900.0,
            rabi_mm: 60.0,
        };
        assert_eq!(fixed.baseline_for(Season::Rabi, &totals), Some(60.0));
    }

    #[test]
    fn test_baseline_serde() {
        let json = r#"{"mode":"fixed","kharif_mm":950.0,"rabi_mm":55.0}"#;
        let baseline: SeasonalBaseline = serde_json::from_str(json).unwrap();
        assert_eq!(
            baseline,
            SeasonalBaseline::Fixed {
                kharif_mm: 950.0,
                rabi_mm: 55.0
            }
        );
        let default: SeasonalBaseline = serde_json::from_str(r#"{"mode":"in_sample"}"#).unwrap();
        assert_eq!(default, SeasonalBaseline::InSample);
    }

    #[test]
    fn test_season_parse() {
        assert_eq!("Kharif".parse::<Season>().unwrap(), Season::Kharif);
        assert!("zaid".parse::<Season>().is_err());
    }
}
