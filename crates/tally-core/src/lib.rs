use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod normalize;
pub mod timestamp;

pub use normalize::{Diagnostics, FieldConfig, group_key, normalize_records};
pub use timestamp::{Resolution, resolve_created_at};

/// A raw export entry as it comes off the wire: an untyped JSON object.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

pub const CREATED_AT_FIELD: &str = "createdAt";
pub const DATE_WRAPPER_FIELD: &str = "$date";
pub const ID_WRAPPER_FIELD: &str = "$oid";
pub const ARCHIVED_FIELD: &str = "archived";
pub const UNKNOWN_GROUP: &str = "Unknown";

/// One normalized workspace entry. Always carries a resolved creation
/// instant; records that fail timestamp resolution never become canonical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub created_at: DateTime<Utc>,
    pub archived: bool,
    pub group_key: String,
    pub id: Option<String>,
}

impl CanonicalRecord {
    pub fn is_active(&self) -> bool {
        !self.archived
    }
}
