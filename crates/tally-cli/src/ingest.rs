use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tally_core::RawRecord;

/// Raw records plus the count of input lines or elements that could not
/// be interpreted as JSON objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedBatch {
    pub records: Vec<RawRecord>,
    pub invalid_json_lines: u64,
}

/// Read a workspace export file. A JSON array is the primary format (a
/// single top-level object becomes a one-element batch); anything else
/// falls back to newline-delimited JSON with per-line skip counting.
pub fn load_raw_records(path: impl AsRef<Path>) -> Result<LoadedBatch> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read export file {}", path.display()))?;
    Ok(parse_batch(&raw))
}

pub fn parse_batch(raw: &str) -> LoadedBatch {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => {
            let mut batch = LoadedBatch::default();
            for item in items {
                match item {
                    Value::Object(record) => batch.records.push(record),
                    _ => batch.invalid_json_lines += 1,
                }
            }
            batch
        }
        Ok(Value::Object(record)) => LoadedBatch {
            records: vec![record],
            invalid_json_lines: 0,
        },
        Ok(_) | Err(_) => parse_json_lines(raw),
    }
}

fn parse_json_lines(raw: &str) -> LoadedBatch {
    let mut batch = LoadedBatch::default();

    for (index, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(record)) => batch.records.push(record),
            Ok(_) => {
                tracing::warn!(line = index + 1, "skipping non-object JSON line");
                batch.invalid_json_lines += 1;
            }
            Err(err) => {
                tracing::warn!(line = index + 1, error = %err, "skipping invalid JSON line");
                batch.invalid_json_lines += 1;
            }
        }
    }

    batch
}
