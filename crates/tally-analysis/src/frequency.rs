use std::collections::HashMap;

use serde::{Serialize, Serializer, ser::SerializeSeq};
use tally_core::{RawRecord, group_key};

/// One group key with its observed count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub key: String,
    pub count: u64,
}

/// Frequency tally that remembers first-encounter order, so ranked views
/// break ties by when a key was first seen rather than alphabetically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<FrequencyEntry>,
    index: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&position) => self.entries[position].count += 1,
            None => {
                self.index.insert(key.to_owned(), self.entries.len());
                self.entries.push(FrequencyEntry {
                    key: key.to_owned(),
                    count: 1,
                });
            }
        }
    }

    pub fn count(&self, key: &str) -> u64 {
        self.index
            .get(key)
            .map_or(0, |&position| self.entries[position].count)
    }

    pub fn unique_keys(&self) -> usize {
        self.entries.len()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|entry| entry.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-encounter order.
    pub fn iter(&self) -> impl Iterator<Item = &FrequencyEntry> {
        self.entries.iter()
    }

    /// All entries ordered by count descending; equal counts keep
    /// first-encounter order (the sort is stable).
    pub fn most_common(&self) -> Vec<&FrequencyEntry> {
        let mut ranked: Vec<&FrequencyEntry> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked
    }

    pub fn top_n(&self, n: usize) -> Vec<&FrequencyEntry> {
        let mut ranked = self.most_common();
        ranked.truncate(n);
        ranked
    }
}

/// Whole-dataset distribution of one raw field, independent of timestamp
/// resolution: every entry counts, with absent values under `"Unknown"`.
pub fn field_distribution(records: &[RawRecord], field: &str) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    for record in records {
        table.record(&group_key(record, field));
    }
    table
}

impl Serialize for FrequencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for entry in &self.entries {
            seq.serialize_element(entry)?;
        }
        seq.end()
    }
}
