use std::fmt;

use serde::Serialize;
use tally_config::PeriodCatalog;
use tally_core::CanonicalRecord;

use crate::frequency::FrequencyTable;

/// Percentage growth of a period's cumulative-active count against the
/// baseline period. A zero baseline never produces a division: growing
/// from zero is its own variant so reports can render it distinctly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Growth {
    Percent(f64),
    FromZero,
}

impl Growth {
    fn vs_baseline(current: u64, baseline: u64) -> Self {
        if baseline > 0 {
            let baseline = baseline as f64;
            Self::Percent((current as f64 - baseline) / baseline * 100.0)
        } else if current > 0 {
            Self::FromZero
        } else {
            Self::Percent(0.0)
        }
    }
}

impl fmt::Display for Growth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(percent) => write!(f, "{percent:+.2}%"),
            Self::FromZero => write!(f, "n/a (grew from 0)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodResult {
    pub name: String,
    /// Non-archived records created at or before the period end.
    pub cumulative_active_at_end: u64,
    /// Non-archived records created strictly before the period start.
    pub cumulative_active_at_start: u64,
    pub created_in_period_active: u64,
    pub created_in_period_archived: u64,
    pub net_change: i64,
    pub growth_vs_baseline: Growth,
    pub group_frequency: FrequencyTable,
}

impl PeriodResult {
    pub fn created_in_period_total(&self) -> u64 {
        self.created_in_period_active + self.created_in_period_archived
    }

    /// Share of in-period creations still active, as a percentage.
    /// `None` when nothing was created in the period.
    pub fn retention_rate(&self) -> Option<f64> {
        let total = self.created_in_period_total();
        (total > 0).then(|| self.created_in_period_active as f64 / total as f64 * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    pub baseline: String,
    pub results: Vec<PeriodResult>,
}

impl PeriodReport {
    pub fn get(&self, name: &str) -> Option<&PeriodResult> {
        self.results.iter().find(|result| result.name == name)
    }

    pub fn baseline_result(&self) -> Option<&PeriodResult> {
        self.get(&self.baseline)
    }
}

#[derive(Default)]
struct PeriodAccumulator {
    cumulative_active_at_end: u64,
    cumulative_active_at_start: u64,
    created_active: u64,
    created_archived: u64,
    group_frequency: FrequencyTable,
}

/// Compute a [`PeriodResult`] for every catalog period in one pass over
/// the canonical sequence, accumulating all periods' counters
/// simultaneously. Expects the sequence sorted by creation instant so
/// frequency tie-breaking reflects chronological first encounter.
pub fn analyze_periods(records: &[CanonicalRecord], catalog: &PeriodCatalog) -> PeriodReport {
    let mut accumulators: Vec<PeriodAccumulator> = catalog
        .iter()
        .map(|_| PeriodAccumulator::default())
        .collect();

    for record in records {
        for ((_, period), accumulator) in catalog.iter().zip(accumulators.iter_mut()) {
            if record.is_active() {
                if record.created_at <= period.end {
                    accumulator.cumulative_active_at_end += 1;
                }
                if record.created_at < period.start {
                    accumulator.cumulative_active_at_start += 1;
                }
            }

            if period.contains(record.created_at) {
                if record.is_active() {
                    accumulator.created_active += 1;
                } else {
                    accumulator.created_archived += 1;
                }
                accumulator.group_frequency.record(&record.group_key);
            }
        }
    }

    let baseline_count = accumulators[catalog.baseline_index()].cumulative_active_at_end;

    let results = catalog
        .iter()
        .zip(accumulators)
        .map(|((name, _), accumulator)| PeriodResult {
            name: name.to_owned(),
            cumulative_active_at_end: accumulator.cumulative_active_at_end,
            cumulative_active_at_start: accumulator.cumulative_active_at_start,
            created_in_period_active: accumulator.created_active,
            created_in_period_archived: accumulator.created_archived,
            net_change: accumulator.cumulative_active_at_end as i64
                - accumulator.cumulative_active_at_start as i64,
            growth_vs_baseline: Growth::vs_baseline(
                accumulator.cumulative_active_at_end,
                baseline_count,
            ),
            group_frequency: accumulator.group_frequency,
        })
        .collect();

    PeriodReport {
        baseline: catalog.baseline().to_owned(),
        results,
    }
}
