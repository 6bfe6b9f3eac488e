use std::fs;

use anyhow::Result;
use tally_analysis::{Growth, analyze_periods, build_daily_series};
use tally_cli::ingest::load_raw_records;
use tally_cli::report::write_period_report;
use tally_config::load_catalog;
use tally_core::{FieldConfig, normalize_records};
use tempfile::tempdir;

#[test]
fn export_file_to_rendered_report() -> Result<()> {
    let temp = tempdir()?;

    let export = temp.path().join("workspaces.json");
    fs::write(
        &export,
        r#"[
            {"createdAt": {"$date": "2024-06-01T00:00:00Z"}, "archived": false, "eonid": "ops", "workspaceId": "w1"},
            {"createdAt": "2025-02-15T00:00:00Z", "eonid": 9001, "workspaceId": "w2"},
            {"createdAt": "2025-02-20T00:00:00Z", "archived": true, "eonid": "ops", "workspaceId": {"$oid": "w3"}},
            {"_id": {"$oid": "507f191e810c19729de860ea"}, "workspaceId": "w4"}
        ]"#,
    )?;

    let catalog_path = temp.path().join("periods.toml");
    fs::write(
        &catalog_path,
        r#"
baseline = "2024"

[[period]]
name = "2024"
start_date = "2024-01-01"
end_date = "2024-12-31"

[[period]]
name = "2025H1"
start_date = "2025-01-01"
end_date = "2025-06-30"
"#,
    )?;

    let batch = load_raw_records(&export)?;
    let (records, mut diagnostics) = normalize_records(&batch.records, &FieldConfig::default());
    diagnostics.invalid_json_lines = batch.invalid_json_lines;

    // The record without createdAt resolves via its ObjectId to 2012, so
    // it counts toward every later cutoff.
    assert_eq!(records.len(), 4);
    assert_eq!(diagnostics.resolved_via_identifier, 1);
    assert_eq!(diagnostics.total_unique_identifiers, 4);

    let catalog = load_catalog(&catalog_path)?;
    let report = analyze_periods(&records, &catalog);

    let baseline = report.get("2024").expect("baseline result");
    assert_eq!(baseline.cumulative_active_at_end, 2);

    let h1 = report.get("2025H1").expect("h1 result");
    assert_eq!(h1.cumulative_active_at_end, 3);
    assert_eq!(h1.created_in_period_active, 1);
    assert_eq!(h1.created_in_period_archived, 1);
    assert_eq!(h1.growth_vs_baseline, Growth::Percent(50.0));

    let mut out = Vec::new();
    write_period_report(&report, &diagnostics, 3, &mut out)?;
    let rendered = String::from_utf8(out)?;

    assert!(rendered.contains("Growth vs 2024"));
    assert!(rendered.contains("+50.00%"));
    assert!(rendered.contains("- 9001: 1"));
    assert!(rendered.contains("- Entries resolved via identifier fallback: 1"));

    Ok(())
}

#[test]
fn ndjson_export_feeds_the_same_pipeline() -> Result<()> {
    let temp = tempdir()?;

    let export = temp.path().join("workspaces.ndjson");
    fs::write(
        &export,
        "{\"createdAt\": \"2025-01-01T08:00:00Z\"}\n\
         this line is broken\n\
         {\"createdAt\": \"2025-01-01T09:00:00Z\"}\n\
         {\"createdAt\": \"2025-01-05T10:00:00Z\", \"archived\": true}\n",
    )?;

    let batch = load_raw_records(&export)?;
    assert_eq!(batch.invalid_json_lines, 1);

    let (records, mut diagnostics) = normalize_records(&batch.records, &FieldConfig::default());
    diagnostics.invalid_json_lines = batch.invalid_json_lines;
    assert_eq!(diagnostics.total_processed, 3);

    let series = build_daily_series(&records, None)?;
    assert_eq!(series.len(), 5);

    let created: Vec<u64> = series.created.iter().map(|(_, n)| *n).collect();
    assert_eq!(created, vec![2, 0, 0, 0, 1]);
    let cumulative: Vec<u64> = series.cumulative_active.iter().map(|(_, n)| *n).collect();
    assert_eq!(cumulative, vec![2, 2, 2, 2, 2]);

    Ok(())
}
