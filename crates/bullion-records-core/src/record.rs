//! Records: string-valued field mappings keyed by wire name.
//!
//! A record is built positionally from caller values and the kind's schema,
//! then encoded as a canonical JSON object (keys in lexicographic order, no
//! insignificant whitespace). Every record carries its own key under `id`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationError};
use crate::kind::{KindSchema, RecordKind, ID_FIELD};
use crate::types::RecordKey;
use crate::validation::check_arity;

/// A stored record of some kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Build a record from positional values.
    ///
    /// Values are matched to the kind's fields by position; the key is
    /// inserted as `id`. Only arity is checked here, see
    /// [`validate_fields`](crate::validation::validate_fields) for value
    /// checks.
    pub fn from_positional<S: AsRef<str>>(
        key: &RecordKey,
        values: &[S],
    ) -> Result<Self, ValidationError> {
        let kind = key.kind();
        let schema = kind.schema();
        check_arity(
            &format!("create{}", kind.name()),
            schema.fields.len(),
            values.len(),
        )?;

        let mut fields = BTreeMap::new();
        fields.insert(ID_FIELD.to_string(), key.as_str().to_string());
        for (name, value) in schema.field_names().zip(values) {
            fields.insert(name.to_string(), value.as_ref().to_string());
        }
        Ok(Self { fields })
    }

    /// Get a field by wire name.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// The record's `id` field.
    pub fn id(&self) -> Option<&str> {
        self.get(ID_FIELD)
    }

    /// Iterate `(field, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields, `id` included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Positional values in the kind's declared order, `id` excluded.
    ///
    /// Missing fields come back as `None`.
    pub fn positional(&self, kind: RecordKind) -> Vec<Option<&str>> {
        kind.schema().field_names().map(|name| self.get(name)).collect()
    }

    /// Encode as canonical JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>, CoreError> {
        Ok(serde_json::to_vec(&self.fields)?)
    }

    /// Decode from JSON bytes.
    ///
    /// Every value must be a string; records with numeric or nested values
    /// are rejected.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CoreError> {
        let fields: BTreeMap<String, String> = serde_json::from_slice(bytes)?;
        Ok(Self { fields })
    }
}

impl KindSchema {
    /// Check that a decoded record has exactly this schema's fields plus `id`.
    pub fn check_record(&self, record: &Record) -> Result<(), ValidationError> {
        if record.id().is_none() {
            return Err(ValidationError::MissingField {
                kind: self.kind,
                field: ID_FIELD,
            });
        }
        if let Some(spec) = self.fields.iter().find(|f| record.get(f.json_name).is_none()) {
            return Err(ValidationError::MissingField {
                kind: self.kind,
                field: spec.json_name,
            });
        }
        if let Some((name, _)) = record
            .iter()
            .find(|(name, _)| *name != ID_FIELD && self.field(name).is_none())
        {
            return Err(ValidationError::UnexpectedField {
                kind: self.kind,
                field: name.to_string(),
            });
        }
        Ok(())
    }
}
