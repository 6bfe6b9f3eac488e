use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::{CREATED_AT_FIELD, DATE_WRAPPER_FIELD, ID_WRAPPER_FIELD, RawRecord};

/// Field carrying the Mongo-style ObjectId used for timestamp fallback.
pub const OID_SOURCE_FIELD: &str = "_id";

const OBJECT_ID_LEN: usize = 24;

const FALLBACK_FORMATS: [&str; 2] = [
    "%Y-%m-%dT%H:%M:%S%.f+00:00",
    "%Y-%m-%dT%H:%M:%S+00:00",
];

/// Outcome of timestamp resolution for one raw record. The four variants
/// are disjoint, so per-outcome tallies sum to the number of records seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Parsed from the creation-time field.
    CreatedAt(DateTime<Utc>),
    /// Creation-time field missing or unparseable; instant recovered from
    /// the embedded ObjectId epoch seconds.
    IdentifierFallback(DateTime<Utc>),
    /// No creation-time field and no usable identifier.
    MissingTimestamp,
    /// Creation-time field present but unparseable, and no usable identifier.
    UnparseableTimestamp,
}

impl Resolution {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::CreatedAt(ts) | Self::IdentifierFallback(ts) => Some(*ts),
            Self::MissingTimestamp | Self::UnparseableTimestamp => None,
        }
    }
}

/// Derive the authoritative creation instant for a raw record.
///
/// Precedence: an explicit `createdAt` string (direct, or nested under a
/// `$date` wrapper) parsed as ISO-8601; otherwise the leading 8 hex chars
/// of a 24-char ObjectId in `_id`, read as big-endian Unix seconds.
/// Malformed values never error, they only shift the outcome.
pub fn resolve_created_at(record: &RawRecord) -> Resolution {
    match created_at_string(record) {
        Some(raw) => match parse_iso_instant(raw) {
            Some(ts) => Resolution::CreatedAt(ts),
            None => match identifier_instant(record) {
                Some(ts) => Resolution::IdentifierFallback(ts),
                None => Resolution::UnparseableTimestamp,
            },
        },
        None => match identifier_instant(record) {
            Some(ts) => Resolution::IdentifierFallback(ts),
            None => Resolution::MissingTimestamp,
        },
    }
}

/// Parse an ISO-8601 datetime, accepting a trailing `Z` as shorthand for
/// `+00:00` and falling back to progressively looser fixed formats.
pub fn parse_iso_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = if let Some(stripped) = value.strip_suffix('Z') {
        format!("{stripped}+00:00")
    } else {
        value.to_owned()
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(&value) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in FALLBACK_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&value, format) {
            return Some(naive.and_utc());
        }
    }

    None
}

/// Extract the creation instant embedded in a Mongo-style ObjectId: the
/// leading 8 hex chars are big-endian Unix seconds. Wrong length or
/// non-hex input yields `None`.
pub fn instant_from_object_id(oid: &str) -> Option<DateTime<Utc>> {
    if oid.len() != OBJECT_ID_LEN || !oid.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let seconds = u32::from_str_radix(&oid[..8], 16).ok()?;
    DateTime::from_timestamp(i64::from(seconds), 0)
}

fn created_at_string(record: &RawRecord) -> Option<&str> {
    match record.get(CREATED_AT_FIELD)? {
        Value::String(raw) => Some(raw),
        Value::Object(wrapper) => wrapper.get(DATE_WRAPPER_FIELD)?.as_str(),
        _ => None,
    }
}

fn identifier_instant(record: &RawRecord) -> Option<DateTime<Utc>> {
    let oid = match record.get(OID_SOURCE_FIELD)? {
        Value::String(raw) => raw,
        Value::Object(wrapper) => wrapper.get(ID_WRAPPER_FIELD)?.as_str()?,
        _ => return None,
    };
    instant_from_object_id(oid)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: serde_json::Value) -> RawRecord {
        value.as_object().expect("object literal").clone()
    }

    #[test]
    fn created_at_wins_over_identifier_fallback() {
        let raw = record(json!({
            "createdAt": { "$date": "2025-02-15T00:00:00Z" },
            "_id": { "$oid": "507f191e810c19729de860ea" },
        }));

        match resolve_created_at(&raw) {
            Resolution::CreatedAt(ts) => {
                assert_eq!(ts.to_rfc3339(), "2025-02-15T00:00:00+00:00");
            }
            other => panic!("expected CreatedAt, got {other:?}"),
        }
    }

    #[test]
    fn object_id_epoch_extraction_matches_known_conversion() {
        // 0x507f191e = 1_350_506_782 seconds = 2012-10-17T20:46:22Z.
        let ts = instant_from_object_id("507f191e810c19729de860ea").expect("valid oid");
        assert_eq!(ts.timestamp(), 1_350_506_782);
        assert_eq!(ts.to_rfc3339(), "2012-10-17T20:46:22+00:00");
    }

    #[test]
    fn identifier_fallback_used_when_created_at_absent() {
        let raw = record(json!({ "_id": "507f191e810c19729de860ea" }));

        match resolve_created_at(&raw) {
            Resolution::IdentifierFallback(ts) => {
                assert_eq!(ts.timestamp(), 1_350_506_782);
            }
            other => panic!("expected IdentifierFallback, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_created_at_rescued_by_identifier() {
        let raw = record(json!({
            "createdAt": "not-a-date",
            "_id": { "$oid": "507f191e810c19729de860ea" },
        }));

        assert!(matches!(
            resolve_created_at(&raw),
            Resolution::IdentifierFallback(_)
        ));
    }

    #[test]
    fn unparseable_created_at_without_identifier_is_its_own_outcome() {
        let raw = record(json!({ "createdAt": "not-a-date" }));
        assert_eq!(resolve_created_at(&raw), Resolution::UnparseableTimestamp);
    }

    #[test]
    fn missing_everything_is_missing_timestamp() {
        let raw = record(json!({ "instance": "prod" }));
        assert_eq!(resolve_created_at(&raw), Resolution::MissingTimestamp);
    }

    #[test]
    fn malformed_identifiers_never_resolve() {
        assert!(instant_from_object_id("507f191e").is_none());
        assert!(instant_from_object_id("zzzf191e810c19729de860ea").is_none());
        assert!(instant_from_object_id("507f191e810c19729de860ea00").is_none());
    }

    #[test]
    fn trailing_z_and_fixed_offset_forms_both_parse() {
        let with_z = parse_iso_instant("2024-06-01T12:30:00Z").expect("z form");
        let with_offset = parse_iso_instant("2024-06-01T12:30:00+00:00").expect("offset form");
        assert_eq!(with_z, with_offset);

        let fractional = parse_iso_instant("2024-06-01T12:30:00.250Z").expect("fractional");
        assert_eq!(fractional.timestamp_subsec_millis(), 250);
    }
}
