use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tally_core::normalize::{DEFAULT_GROUP_FIELD, DEFAULT_ID_FIELD};

#[derive(Debug, Parser)]
#[command(author, version, about = "Workspace export metrics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Period aggregation report: cumulative active counts, in-period
    /// creations, growth vs baseline, top group frequencies
    Periods(PeriodsArgs),
    /// Daily creation and cumulative-active series as CSV
    Daily(DailyArgs),
    /// Creation counts per calendar month across a month range
    Monthly(MonthlyArgs),
    /// Whole-dataset value distributions for selected raw fields
    Distribution(DistributionArgs),
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct IngestArgs {
    #[arg(help = "Workspace export: JSON array or newline-delimited JSON")]
    pub input: PathBuf,

    #[arg(
        long,
        default_value = DEFAULT_GROUP_FIELD,
        help = "Raw field used for group frequency analysis"
    )]
    pub group_field: String,

    #[arg(
        long,
        default_value = DEFAULT_ID_FIELD,
        help = "Raw field used for unique-identifier counting"
    )]
    pub id_field: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct PeriodsArgs {
    #[command(flatten)]
    pub ingest: IngestArgs,

    #[arg(
        long,
        help = "Period catalog TOML; a built-in 2024/2025 catalog is used when omitted"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        default_value_t = 5,
        help = "How many most frequent group keys to list per period"
    )]
    pub top_n: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct DailyArgs {
    #[command(flatten)]
    pub ingest: IngestArgs,

    #[arg(
        long,
        requires = "end",
        help = "Explicit series start date (YYYY-MM-DD, UTC); defaults to the earliest observed date"
    )]
    pub start: Option<NaiveDate>,

    #[arg(
        long,
        requires = "start",
        help = "Explicit series end date (YYYY-MM-DD, UTC); defaults to the latest observed date"
    )]
    pub end: Option<NaiveDate>,

    #[arg(
        long,
        default_value = "daily_created.csv",
        help = "Output path for the per-day creation counts"
    )]
    pub created_out: PathBuf,

    #[arg(
        long,
        default_value = "daily_active.csv",
        help = "Output path for the per-day cumulative active counts"
    )]
    pub active_out: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct MonthlyArgs {
    #[command(flatten)]
    pub ingest: IngestArgs,

    #[arg(long, help = "First month of the range (YYYY-MM)")]
    pub start: MonthArg,

    #[arg(long, help = "Last month of the range (YYYY-MM)")]
    pub end: MonthArg,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct DistributionArgs {
    #[arg(help = "Workspace export: JSON array or newline-delimited JSON")]
    pub input: PathBuf,

    #[arg(
        long = "field",
        default_values_t = ["instance".to_owned(), "readRole".to_owned(), "writeRole".to_owned()],
        help = "Raw field to tally; repeat for several fields"
    )]
    pub fields: Vec<String>,
}

/// A calendar month given as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthArg {
    pub year: i32,
    pub month: u32,
}

impl std::str::FromStr for MonthArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (year, month) = value
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("invalid month '{value}', expected YYYY-MM"))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in '{value}', expected YYYY-MM"))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month in '{value}', expected YYYY-MM"))?;
        if !(1..=12).contains(&month) {
            return Err(format!("month out of range in '{value}', expected 01-12"));
        }
        Ok(Self { year, month })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_arg_parses_and_validates() {
        let parsed: MonthArg = "2025-06".parse().expect("valid month");
        assert_eq!(parsed, MonthArg {
            year: 2025,
            month: 6
        });

        assert!("2025".parse::<MonthArg>().is_err());
        assert!("2025-13".parse::<MonthArg>().is_err());
        assert!("20xx-06".parse::<MonthArg>().is_err());
    }

    #[test]
    fn cli_parses_periods_with_defaults() {
        let cli = Cli::try_parse_from(["tally", "periods", "workspaces.json"]).expect("parse");

        match cli.command {
            Command::Periods(args) => {
                assert_eq!(args.ingest.group_field, DEFAULT_GROUP_FIELD);
                assert_eq!(args.ingest.id_field, DEFAULT_ID_FIELD);
                assert_eq!(args.top_n, 5);
                assert!(args.config.is_none());
            }
            other => panic!("expected periods, got {other:?}"),
        }
    }

    #[test]
    fn daily_bounds_must_come_together() {
        let err = Cli::try_parse_from(["tally", "daily", "ws.json", "--start", "2025-01-01"]);
        assert!(err.is_err());

        let ok = Cli::try_parse_from([
            "tally",
            "daily",
            "ws.json",
            "--start",
            "2025-01-01",
            "--end",
            "2025-01-31",
        ]);
        assert!(ok.is_ok());
    }
}
