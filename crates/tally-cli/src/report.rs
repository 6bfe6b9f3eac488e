use std::io::Write;

use chrono::NaiveDate;
use tally_analysis::{Comparison, FrequencyTable, MonthlyPoint, PeriodReport};
use tally_core::Diagnostics;

pub const DAILY_CREATED_HEADER: &str = "date,created_count";
pub const DAILY_ACTIVE_HEADER: &str = "date,cumulative_active";

/// Render the period table, per-period group frequencies, and the
/// data-quality summary. Diagnostics are always part of the report so a
/// consumer can judge how much of the export was usable.
pub fn write_period_report(
    report: &PeriodReport,
    diagnostics: &Diagnostics,
    top_n: usize,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    let growth_header = format!("Growth vs {}", report.baseline);
    let header = format!(
        "{:<12} {:>12} {:>14} {:>14} {:>16} {:>8} {:>22}",
        "Period", "Active End", "Active Start", "Created Active", "Created Archived", "Net", growth_header
    );
    writeln!(out, "{header}")?;
    writeln!(out, "{}", "-".repeat(header.len()))?;

    for result in &report.results {
        writeln!(
            out,
            "{:<12} {:>12} {:>14} {:>14} {:>16} {:>+8} {:>22}",
            result.name,
            result.cumulative_active_at_end,
            result.cumulative_active_at_start,
            result.created_in_period_active,
            result.created_in_period_archived,
            result.net_change,
            result.growth_vs_baseline.to_string()
        )?;
    }

    let baseline_created = report
        .baseline_result()
        .map(|result| result.created_in_period_total());

    for result in &report.results {
        writeln!(out)?;
        writeln!(out, "{}: top {top_n} groups (created in period)", result.name)?;
        if result.group_frequency.is_empty() {
            writeln!(out, "  (no creations in period)")?;
        } else {
            for entry in result.group_frequency.top_n(top_n) {
                writeln!(out, "  - {}: {}", entry.key, entry.count)?;
            }
        }
        if let Some(rate) = result.retention_rate() {
            writeln!(out, "  retention of in-period creations: {rate:.2}%")?;
        }
        if result.name != report.baseline {
            if let Some(previous) = baseline_created {
                let comparison =
                    Comparison::between(result.created_in_period_total(), previous);
                writeln!(
                    out,
                    "  creations vs {}: {comparison}",
                    report.baseline
                )?;
            }
        }
    }

    writeln!(out)?;
    write_diagnostics(diagnostics, out)
}

pub fn write_diagnostics(diagnostics: &Diagnostics, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "--- Data Processing Summary ---")?;
    writeln!(
        out,
        "- Total raw entries processed: {}",
        diagnostics.total_processed
    )?;
    writeln!(
        out,
        "- Unique identifiers observed: {}",
        diagnostics.total_unique_identifiers
    )?;
    if diagnostics.invalid_json_lines > 0 {
        writeln!(
            out,
            "- Lines skipped due to invalid JSON structure: {}",
            diagnostics.invalid_json_lines
        )?;
    }
    if diagnostics.missing_timestamp > 0 {
        writeln!(
            out,
            "- Entries skipped due to missing creation timestamp: {}",
            diagnostics.missing_timestamp
        )?;
    }
    if diagnostics.unparseable_timestamp > 0 {
        writeln!(
            out,
            "- Entries skipped due to unparseable creation timestamp: {}",
            diagnostics.unparseable_timestamp
        )?;
    }
    if diagnostics.resolved_via_identifier > 0 {
        writeln!(
            out,
            "- Entries resolved via identifier fallback: {}",
            diagnostics.resolved_via_identifier
        )?;
    }
    Ok(())
}

/// One `date,value` CSV series suitable for spreadsheet import.
pub fn write_series_csv(
    header: &str,
    rows: &[(NaiveDate, u64)],
    out: &mut dyn Write,
) -> std::io::Result<()> {
    writeln!(out, "{header}")?;
    for (date, value) in rows {
        writeln!(out, "{},{value}", date.format("%Y-%m-%d"))?;
    }
    Ok(())
}

/// Overall field distributions in descending frequency order, one block
/// per field.
pub fn write_distributions(
    distributions: &[(String, FrequencyTable)],
    out: &mut dyn Write,
) -> std::io::Result<()> {
    for (field, table) in distributions {
        writeln!(out, "Distribution of '{field}' (overall):")?;
        if table.is_empty() {
            writeln!(out, "  (no data)")?;
        } else {
            for entry in table.most_common() {
                writeln!(out, "  - {}: {}", entry.key, entry.count)?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_monthly_table(series: &[MonthlyPoint], out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "--- Workspace creations per month ---")?;
    for point in series {
        writeln!(
            out,
            "- {:04}-{:02}: {} created",
            point.year, point.month, point.created
        )?;
    }
    Ok(())
}
