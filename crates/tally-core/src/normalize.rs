use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::timestamp::{Resolution, resolve_created_at};
use crate::{ARCHIVED_FIELD, CanonicalRecord, ID_WRAPPER_FIELD, RawRecord, UNKNOWN_GROUP};

pub const DEFAULT_GROUP_FIELD: &str = "eonid";
pub const DEFAULT_ID_FIELD: &str = "workspaceId";

/// Which raw fields feed the grouping and uniqueness metrics. The export
/// format leaves these loose, so they are caller configuration rather
/// than constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub group_field: String,
    pub id_field: String,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            group_field: DEFAULT_GROUP_FIELD.to_owned(),
            id_field: DEFAULT_ID_FIELD.to_owned(),
        }
    }
}

impl FieldConfig {
    pub fn new(group_field: impl Into<String>, id_field: impl Into<String>) -> Self {
        Self {
            group_field: group_field.into(),
            id_field: id_field.into(),
        }
    }
}

/// Data-quality counters reported alongside every result set.
/// `invalid_json_lines` is filled by the ingest collaborator; the
/// normalizer itself never sees malformed containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub total_processed: u64,
    pub missing_timestamp: u64,
    pub unparseable_timestamp: u64,
    pub resolved_via_identifier: u64,
    pub total_unique_identifiers: u64,
    pub invalid_json_lines: u64,
}

impl Diagnostics {
    pub fn skipped(&self) -> u64 {
        self.missing_timestamp + self.unparseable_timestamp
    }
}

/// Normalize raw records into the canonical, time-sorted sequence.
///
/// Records without a resolvable creation instant are dropped and tallied;
/// everything else becomes a [`CanonicalRecord`]. The output is stably
/// sorted by creation instant, ties keeping input order.
pub fn normalize_records(
    records: &[RawRecord],
    fields: &FieldConfig,
) -> (Vec<CanonicalRecord>, Diagnostics) {
    let mut canonical = Vec::with_capacity(records.len());
    let mut diagnostics = Diagnostics {
        total_processed: records.len() as u64,
        ..Diagnostics::default()
    };
    let mut unique_ids: HashSet<String> = HashSet::new();

    for record in records {
        let created_at = match resolve_created_at(record) {
            Resolution::CreatedAt(ts) => ts,
            Resolution::IdentifierFallback(ts) => {
                diagnostics.resolved_via_identifier += 1;
                ts
            }
            Resolution::MissingTimestamp => {
                diagnostics.missing_timestamp += 1;
                continue;
            }
            Resolution::UnparseableTimestamp => {
                diagnostics.unparseable_timestamp += 1;
                continue;
            }
        };

        let id = extract_id(record, &fields.id_field);
        if let Some(id) = &id {
            unique_ids.insert(id.clone());
        }

        canonical.push(CanonicalRecord {
            created_at,
            archived: is_archived(record),
            group_key: group_key(record, &fields.group_field),
            id,
        });
    }

    diagnostics.total_unique_identifiers = unique_ids.len() as u64;
    canonical.sort_by_key(|record| record.created_at);

    (canonical, diagnostics)
}

/// Archived only when the raw value is the literal boolean `true`;
/// strings, numbers, and absence all normalize to false.
fn is_archived(record: &RawRecord) -> bool {
    matches!(record.get(ARCHIVED_FIELD), Some(Value::Bool(true)))
}

/// Stringify a grouping attribute: scalars become their string form,
/// anything absent or non-scalar becomes the `"Unknown"` sentinel.
pub fn group_key(record: &RawRecord, field: &str) -> String {
    match record.get(field) {
        Some(Value::String(raw)) => raw.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => UNKNOWN_GROUP.to_owned(),
    }
}

/// Identifier shapes: a plain string, a number, or an `$oid` wrapper.
/// Anything else is unusable for set membership and drops the record from
/// identifier-based metrics only.
fn extract_id(record: &RawRecord, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(raw) => Some(raw.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(wrapper) => wrapper
            .get(ID_WRAPPER_FIELD)
            .and_then(Value::as_str)
            .map(str::to_owned),
        _ => None,
    }
}
