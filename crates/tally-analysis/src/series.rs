use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tally_core::CanonicalRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no usable records and no explicit date bounds, series range is undefined")]
    EmptyInput,
    #[error("series range ends before it starts")]
    InvalidRange,
}

/// Two parallel day-indexed series over one gap-free UTC date range:
/// creations per day (any archived state) and the running total of
/// currently-active records created on or before each day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySeries {
    pub created: Vec<(NaiveDate, u64)>,
    pub cumulative_active: Vec<(NaiveDate, u64)>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.created.len()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }
}

/// Build the daily series across every calendar day from the earliest to
/// the latest observed creation date, inclusive, or across the explicit
/// `bounds` when given. Days without activity appear with a zero creation
/// count and a carried-forward cumulative value.
///
/// The cumulative series counts records not *currently* archived; with no
/// archival timestamps in the data it is monotonically non-decreasing and
/// never retroactively reduced.
pub fn build_daily_series(
    records: &[CanonicalRecord],
    bounds: Option<(NaiveDate, NaiveDate)>,
) -> Result<DailySeries, AnalysisError> {
    let (start, end) = match bounds {
        Some((start, end)) => {
            if end < start {
                return Err(AnalysisError::InvalidRange);
            }
            (start, end)
        }
        None => observed_date_range(records).ok_or(AnalysisError::EmptyInput)?,
    };

    let mut created_per_day: HashMap<NaiveDate, u64> = HashMap::new();
    let mut active_created_per_day: HashMap<NaiveDate, u64> = HashMap::new();
    for record in records {
        let day = record.created_at.date_naive();
        *created_per_day.entry(day).or_default() += 1;
        if record.is_active() {
            *active_created_per_day.entry(day).or_default() += 1;
        }
    }

    let mut created = Vec::new();
    let mut cumulative_active = Vec::new();
    // Records created before an explicit start bound still count toward
    // the running total shown from day one.
    let mut running_active: u64 = records
        .iter()
        .filter(|record| record.is_active() && record.created_at.date_naive() < start)
        .count() as u64;

    let mut day = start;
    loop {
        created.push((day, created_per_day.get(&day).copied().unwrap_or(0)));
        running_active += active_created_per_day.get(&day).copied().unwrap_or(0);
        cumulative_active.push((day, running_active));

        if day >= end {
            break;
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    Ok(DailySeries {
        created,
        cumulative_active,
    })
}

fn observed_date_range(records: &[CanonicalRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let first = records
        .iter()
        .map(|record| record.created_at.date_naive())
        .min()?;
    let last = records
        .iter()
        .map(|record| record.created_at.date_naive())
        .max()?;
    Some((first, last))
}

/// Creation count for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyPoint {
    pub year: i32,
    pub month: u32,
    pub created: u64,
}

/// Creation counts per calendar month across an inclusive month range,
/// gap-free: months without creations appear with zero. The range is
/// explicit, so an empty record set is fine here.
pub fn build_monthly_series(
    records: &[CanonicalRecord],
    start: (i32, u32),
    end: (i32, u32),
) -> Result<Vec<MonthlyPoint>, AnalysisError> {
    if end < start {
        return Err(AnalysisError::InvalidRange);
    }

    let mut per_month: HashMap<(i32, u32), u64> = HashMap::new();
    for record in records {
        let key = (record.created_at.year(), record.created_at.month());
        if start <= key && key <= end {
            *per_month.entry(key).or_default() += 1;
        }
    }

    let mut series = Vec::new();
    let (mut year, mut month) = start;
    loop {
        series.push(MonthlyPoint {
            year,
            month,
            created: per_month.get(&(year, month)).copied().unwrap_or(0),
        });

        if (year, month) >= end {
            break;
        }
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }

    Ok(series)
}
