use std::fmt;

use serde::Serialize;

/// Typed period-over-period comparison of two counts, for "P1 vs P2"
/// report lines. Percentages are always relative to the previous value,
/// so a zero previous value gets its own variant instead of a division.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    IncreasedFromZero { to: u64 },
    Increased { diff: u64, percent: f64 },
    Decreased { diff: u64, percent: f64 },
    Unchanged { at: u64 },
}

impl Comparison {
    pub fn between(current: u64, previous: u64) -> Self {
        if previous == 0 {
            return if current > 0 {
                Self::IncreasedFromZero { to: current }
            } else {
                Self::Unchanged { at: 0 }
            };
        }

        if current > previous {
            let diff = current - previous;
            Self::Increased {
                diff,
                percent: diff as f64 / previous as f64 * 100.0,
            }
        } else if current < previous {
            let diff = previous - current;
            Self::Decreased {
                diff,
                percent: diff as f64 / previous as f64 * 100.0,
            }
        } else {
            Self::Unchanged { at: current }
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncreasedFromZero { to } => {
                write!(f, "increased from 0 to {to}")
            }
            Self::Increased { diff, percent } => {
                write!(f, "increased by {diff} ({percent:+.2}%)")
            }
            Self::Decreased { diff, percent } => {
                write!(f, "decreased by {diff} (-{percent:.2}%)")
            }
            Self::Unchanged { at } => write!(f, "remained at {at}"),
        }
    }
}
