use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tally_analysis::{analyze_periods, build_daily_series, build_monthly_series, field_distribution};
use tally_cli::cli::{Cli, Command, DailyArgs, DistributionArgs, IngestArgs, MonthlyArgs, PeriodsArgs};
use tally_cli::ingest::load_raw_records;
use tally_cli::report::{
    DAILY_ACTIVE_HEADER, DAILY_CREATED_HEADER, write_distributions, write_monthly_table,
    write_period_report, write_series_csv,
};
use tally_config::{ConfigError, Period, PeriodCatalog, load_catalog};
use tally_core::{CanonicalRecord, Diagnostics, FieldConfig, normalize_records};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Periods(args) => run_periods(args),
        Command::Daily(args) => run_daily(args),
        Command::Monthly(args) => run_monthly(args),
        Command::Distribution(args) => run_distribution(args),
    }
}

fn load_canonical(args: &IngestArgs) -> Result<(Vec<CanonicalRecord>, Diagnostics)> {
    let batch = load_raw_records(&args.input)?;
    let fields = FieldConfig::new(&args.group_field, &args.id_field);
    let (records, mut diagnostics) = normalize_records(&batch.records, &fields);
    diagnostics.invalid_json_lines = batch.invalid_json_lines;

    tracing::info!(
        total = diagnostics.total_processed,
        usable = records.len(),
        skipped = diagnostics.skipped(),
        "normalized workspace export"
    );

    Ok((records, diagnostics))
}

fn run_periods(args: PeriodsArgs) -> Result<()> {
    let (records, diagnostics) = load_canonical(&args.ingest)?;

    let catalog = match &args.config {
        Some(path) => load_catalog(path)
            .with_context(|| format!("failed to load period catalog {}", path.display()))?,
        None => default_catalog()?,
    };

    let report = analyze_periods(&records, &catalog);

    let mut out = std::io::stdout();
    write_period_report(&report, &diagnostics, args.top_n, &mut out)
        .context("failed to write period report")?;
    Ok(())
}

fn run_daily(args: DailyArgs) -> Result<()> {
    let (records, diagnostics) = load_canonical(&args.ingest)?;

    let bounds = args.start.zip(args.end);
    let series = build_daily_series(&records, bounds)
        .context("failed to build daily series")?;

    write_csv_file(&args.created_out, DAILY_CREATED_HEADER, &series.created)?;
    write_csv_file(&args.active_out, DAILY_ACTIVE_HEADER, &series.cumulative_active)?;

    println!(
        "wrote {} and {} ({} days, {} of {} records usable)",
        args.created_out.display(),
        args.active_out.display(),
        series.len(),
        diagnostics.total_processed - diagnostics.skipped(),
        diagnostics.total_processed
    );
    Ok(())
}

fn run_monthly(args: MonthlyArgs) -> Result<()> {
    let (records, _) = load_canonical(&args.ingest)?;

    let series = build_monthly_series(
        &records,
        (args.start.year, args.start.month),
        (args.end.year, args.end.month),
    )
    .context("failed to build monthly series")?;

    let mut out = std::io::stdout();
    write_monthly_table(&series, &mut out).context("failed to write monthly table")?;
    Ok(())
}

fn run_distribution(args: DistributionArgs) -> Result<()> {
    let batch = load_raw_records(&args.input)?;
    if batch.invalid_json_lines > 0 {
        tracing::warn!(
            skipped = batch.invalid_json_lines,
            "export contained unusable entries"
        );
    }

    let distributions: Vec<_> = args
        .fields
        .iter()
        .map(|field| (field.clone(), field_distribution(&batch.records, field)))
        .collect();

    let mut out = std::io::stdout();
    write_distributions(&distributions, &mut out).context("failed to write distributions")?;
    Ok(())
}

fn write_csv_file(path: &Path, header: &str, rows: &[(NaiveDate, u64)]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_series_csv(header, rows, &mut writer)
        .with_context(|| format!("failed to write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

/// Built-in catalog mirroring the default reporting windows: full 2024 as
/// the baseline, then 2025 halves and the full year.
fn default_catalog() -> Result<PeriodCatalog, ConfigError> {
    let periods = vec![
        ("2024_FULL", "2024-01-01", "2024-12-31"),
        ("2025_H1", "2025-01-01", "2025-06-30"),
        ("2025_H2", "2025-07-01", "2025-12-31"),
        ("2025_FULL", "2025-01-01", "2025-12-31"),
    ];

    let periods = periods
        .into_iter()
        .map(|(name, start, end)| {
            let start: NaiveDate = start.parse().map_err(|_| ConfigError::InvalidDate {
                name: name.to_owned(),
                value: start.to_owned(),
            })?;
            let end: NaiveDate = end.parse().map_err(|_| ConfigError::InvalidDate {
                name: name.to_owned(),
                value: end.to_owned(),
            })?;
            Ok((name.to_owned(), Period::from_dates(start, end)))
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    PeriodCatalog::new(periods, "2024_FULL")
}
