use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse period catalog TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("invalid date '{value}' in period '{name}', expected YYYY-MM-DD")]
    InvalidDate { name: String, value: String },
    #[error("period '{name}' ends before it starts")]
    InvalidPeriod { name: String },
    #[error("duplicate period name '{name}'")]
    DuplicatePeriod { name: String },
    #[error("baseline period '{name}' is not defined in the catalog")]
    UnknownBaseline { name: String },
}

/// A named, closed UTC interval. Both ends are inclusive; date-based
/// construction covers the full days (00:00:00.000000 through
/// 23:59:59.999999).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: day_start(start),
            end: day_end(end),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

pub fn day_end(date: NaiveDate) -> DateTime<Utc> {
    day_start(date) + TimeDelta::days(1) - TimeDelta::microseconds(1)
}

/// Ordered mapping of period name to interval plus the designated baseline
/// for growth comparisons. Insertion order defines report order; overlap
/// and gaps between periods are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodCatalog {
    periods: Vec<(String, Period)>,
    baseline: String,
    baseline_index: usize,
}

impl PeriodCatalog {
    pub fn new(
        periods: Vec<(String, Period)>,
        baseline: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let baseline = baseline.into();

        for (index, (name, period)) in periods.iter().enumerate() {
            if period.end < period.start {
                return Err(ConfigError::InvalidPeriod { name: name.clone() });
            }
            if periods[..index].iter().any(|(other, _)| other == name) {
                return Err(ConfigError::DuplicatePeriod { name: name.clone() });
            }
        }

        let baseline_index = periods
            .iter()
            .position(|(name, _)| *name == baseline)
            .ok_or_else(|| ConfigError::UnknownBaseline {
                name: baseline.clone(),
            })?;

        Ok(Self {
            periods,
            baseline,
            baseline_index,
        })
    }

    pub fn baseline(&self) -> &str {
        &self.baseline
    }

    pub fn baseline_index(&self) -> usize {
        self.baseline_index
    }

    pub fn baseline_period(&self) -> &Period {
        &self.periods[self.baseline_index].1
    }

    pub fn get(&self, name: &str) -> Option<&Period> {
        self.periods
            .iter()
            .find(|(other, _)| other == name)
            .map(|(_, period)| period)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Period)> {
        self.periods
            .iter()
            .map(|(name, period)| (name.as_str(), period))
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CatalogFile {
    baseline: String,
    #[serde(default)]
    period: Vec<PeriodSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PeriodSpec {
    name: String,
    start_date: String,
    end_date: String,
}

/// Load a period catalog from a TOML file. The array-of-tables layout
/// keeps the file's period order as the report order:
///
/// ```toml
/// baseline = "2024_FULL"
///
/// [[period]]
/// name = "2024_FULL"
/// start_date = "2024-01-01"
/// end_date = "2024-12-31"
/// ```
pub fn load_catalog(path: impl AsRef<Path>) -> Result<PeriodCatalog, ConfigError> {
    let raw = fs::read_to_string(path)?;
    let parsed: CatalogFile = toml::from_str(&raw)?;

    let mut periods = Vec::with_capacity(parsed.period.len());
    for spec in &parsed.period {
        let start = parse_date(&spec.name, &spec.start_date)?;
        let end = parse_date(&spec.name, &spec.end_date)?;
        periods.push((spec.name.clone(), Period::from_dates(start, end)));
    }

    PeriodCatalog::new(periods, parsed.baseline)
}

fn parse_date(period_name: &str, value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| ConfigError::InvalidDate {
        name: period_name.to_owned(),
        value: value.to_owned(),
    })
}
