//! Query response assembly.
//!
//! A range query folds ledger entries into [`QueryResults`], which
//! serializes as one JSON array of `{"Key": ..., "Record": ...}` objects.
//! Record bytes are embedded verbatim as raw JSON, never parsed into a
//! value tree and re-rendered.

use bullion_records_core::RecordKind;
use bullion_records_ledger::LedgerEntry;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{RecordStoreError, Result};

/// One element of a range query response.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryEntry {
    /// The record's ledger key.
    #[serde(rename = "Key")]
    pub key: String,
    /// The stored record JSON, exactly as written.
    #[serde(rename = "Record")]
    pub record: Box<RawValue>,
}

impl QueryEntry {
    /// Wrap a scanned ledger entry.
    ///
    /// Fails if the stored bytes are not UTF-8 or not a JSON object.
    pub fn from_ledger(kind: RecordKind, entry: LedgerEntry) -> Result<Self> {
        let corrupt = |reason: String| RecordStoreError::CorruptRecord {
            kind,
            key: entry.key.clone(),
            reason,
        };

        let text = String::from_utf8(entry.value.to_vec()).map_err(|e| corrupt(e.to_string()))?;
        let record = RawValue::from_string(text).map_err(|e| corrupt(e.to_string()))?;
        if !record.get().trim_start().starts_with('{') {
            return Err(corrupt("stored value is not a JSON object".into()));
        }

        Ok(Self {
            key: entry.key,
            record,
        })
    }

    /// The raw record JSON.
    pub fn record_json(&self) -> &str {
        self.record.get()
    }
}

/// The ordered result of a range query.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryResults {
    entries: Vec<QueryEntry>,
}

impl QueryResults {
    /// Wrap entries already in ascending key order.
    pub fn new(entries: Vec<QueryEntry>) -> Self {
        Self { entries }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the query matched nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> std::slice::Iter<'_, QueryEntry> {
        self.entries.iter()
    }

    /// Keys in order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    /// Unwrap into the entry vector.
    pub fn into_entries(self) -> Vec<QueryEntry> {
        self.entries
    }

    /// Serialize as a single JSON array.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.entries)
            .map_err(|e| RecordStoreError::Core(e.into()))
    }
}

impl<'a> IntoIterator for &'a QueryResults {
    type Item = &'a QueryEntry;
    type IntoIter = std::slice::Iter<'a, QueryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use proptest::prelude::*;

    fn entry(key: &str, value: &str) -> QueryEntry {
        QueryEntry::from_ledger(
            RecordKind::Sell,
            LedgerEntry::new(key, Bytes::from(value.to_string())),
        )
        .unwrap()
    }

    fn render(entries: Vec<QueryEntry>) -> String {
        String::from_utf8(QueryResults::new(entries).to_json().unwrap()).unwrap()
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(render(vec![]), "[]");
    }

    #[test]
    fn test_single_element_has_no_commas_outside_record() {
        let json = render(vec![entry("Sell-1", r#"{"id":"Sell-1"}"#)]);
        assert_eq!(json, r#"[{"Key":"Sell-1","Record":{"id":"Sell-1"}}]"#);
    }

    #[test]
    fn test_many_elements_one_comma_between_each() {
        let json = render(vec![
            entry("Sell-1", r#"{"id":"Sell-1"}"#),
            entry("Sell-2", r#"{"id":"Sell-2"}"#),
            entry("Sell-3", r#"{"id":"Sell-3"}"#),
        ]);
        assert_eq!(
            json,
            concat!(
                r#"[{"Key":"Sell-1","Record":{"id":"Sell-1"}},"#,
                r#"{"Key":"Sell-2","Record":{"id":"Sell-2"}},"#,
                r#"{"Key":"Sell-3","Record":{"id":"Sell-3"}}]"#
            )
        );
        assert!(!json.contains(",]"));
        assert!(!json.contains("[,"));
        assert!(!json.contains(",,"));
    }

    #[test]
    fn test_record_embedded_verbatim() {
        let stored = r#"{ "id" : "Sell-9",  "grams":"1.50" }"#;
        let e = entry("Sell-9", stored);
        assert_eq!(e.record_json(), stored);

        let json = render(vec![e]);
        assert!(json.contains(stored));
    }

    #[test]
    fn test_key_is_escaped() {
        let json = render(vec![entry("Sell-\"q\"", "{}")]);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["Key"], "Sell-\"q\"");
    }

    #[test]
    fn test_rejects_corrupt_values() {
        for bad in ["not json", "[1,2]", "\"str\"", ""] {
            let err = QueryEntry::from_ledger(
                RecordKind::Buy,
                LedgerEntry::new("Buy-1", Bytes::from(bad.to_string())),
            )
            .unwrap_err();
            assert!(matches!(err, RecordStoreError::CorruptRecord { .. }));
        }

        let invalid_utf8 = QueryEntry::from_ledger(
            RecordKind::Buy,
            LedgerEntry::new("Buy-1", Bytes::from_static(&[0xff, 0xfe])),
        );
        assert!(invalid_utf8.is_err());
    }

    #[test]
    fn test_results_accessors() {
        let results = QueryResults::new(vec![
            entry("Sell-1", "{}"),
            entry("Sell-2", "{}"),
        ]);
        assert_eq!(results.len(), 2);
        assert!(!results.is_empty());
        assert_eq!(results.keys(), vec!["Sell-1", "Sell-2"]);
        assert_eq!((&results).into_iter().count(), 2);
    }

    proptest! {
        #[test]
        fn test_array_shape_for_any_count(ids in prop::collection::vec("[a-z0-9]{1,8}", 0..16)) {
            let entries: Vec<QueryEntry> = ids
                .iter()
                .map(|id| {
                    let key = format!("Sell-{}", id);
                    entry(&key, &format!(r#"{{"id":"{}"}}"#, key))
                })
                .collect();
            let json = render(entries);

            prop_assert!(json.starts_with('['));
            prop_assert!(json.ends_with(']'));
            prop_assert_eq!(json.matches("},{\"Key\"").count(), ids.len().saturating_sub(1));

            let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(parsed.as_array().unwrap().len(), ids.len());
        }
    }
}
