//! Strong type definitions for record keys and scan ranges.
//!
//! Keys are newtypes so a caller-supplied correlation ID (an order ID, a
//! user ID) can never be mistaken for the primary key of a record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::kind::{RecordKind, KEY_SEPARATOR};

/// The primary key of a stored record: `<kind-prefix>-<generated-id>`.
///
/// The same string is embedded in the record itself under `id`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordKey {
    key: String,
    kind: RecordKind,
}

impl RecordKey {
    /// Build the key for a freshly generated identifier.
    pub fn new(kind: RecordKind, id: &str) -> Self {
        Self {
            key: format!("{}{}{}", kind.prefix(), KEY_SEPARATOR, id),
            kind,
        }
    }

    /// Parse a key, recovering the kind from its prefix.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let (prefix, id) = s
            .split_once(KEY_SEPARATOR)
            .ok_or_else(|| CoreError::MalformedKey(s.to_string()))?;
        if id.is_empty() {
            return Err(CoreError::MalformedKey(s.to_string()));
        }
        let kind = RecordKind::ALL
            .into_iter()
            .find(|kind| kind.prefix() == prefix)
            .ok_or_else(|| CoreError::MalformedKey(s.to_string()))?;
        Ok(Self {
            key: s.to_string(),
            kind,
        })
    }

    /// The kind whose namespace this key lives in.
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// The generated identifier part, without the kind prefix.
    pub fn id(&self) -> &str {
        self.key
            .split_once(KEY_SEPARATOR)
            .map(|(_, id)| id)
            .unwrap_or_default()
    }

    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Take ownership of the underlying string.
    pub fn into_string(self) -> String {
        self.key
    }
}

impl TryFrom<String> for RecordKey {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<RecordKey> for String {
    fn from(key: RecordKey) -> Self {
        key.key
    }
}

impl fmt::Debug for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordKey({})", self.key)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for RecordKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

/// A half-open key interval `[start, end)` covering one kind's namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRange {
    /// Inclusive lower bound.
    pub start: String,
    /// Exclusive upper bound.
    pub end: String,
}

impl ScanRange {
    /// Create a range from explicit bounds.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// The range holding every key of `kind` and nothing else.
    ///
    /// The end bound is the lexicographic successor of `<prefix>-`, so no
    /// key carrying the prefix can reach it.
    pub fn for_kind(kind: RecordKind) -> Self {
        let start = format!("{}{}", kind.prefix(), KEY_SEPARATOR);
        let end = lex_successor(&start).unwrap_or_default();
        Self { start, end }
    }

    /// Whether `key` falls inside the range.
    pub fn contains(&self, key: &str) -> bool {
        key >= self.start.as_str() && key < self.end.as_str()
    }

    /// Whether the bounds describe a usable interval.
    pub fn is_well_formed(&self) -> bool {
        self.start <= self.end
    }
}

/// Computes the smallest string strictly greater than every string that
/// starts with `s`.
///
/// Works from the last character backwards, bumping it to the next scalar
/// value. Characters already at `char::MAX` are dropped. Returns `None` for
/// the empty string or a string made only of `char::MAX`.
pub fn lex_successor(s: &str) -> Option<String> {
    let mut chars: Vec<char> = s.chars().collect();
    while let Some(last) = chars.pop() {
        if let Some(next) = next_char(last) {
            chars.push(next);
            return Some(chars.into_iter().collect());
        }
    }
    None
}

fn next_char(c: char) -> Option<char> {
    let mut code = u32::from(c).checked_add(1)?;
    // Skip the surrogate block, which holds no scalar values.
    if (0xD800..=0xDFFF).contains(&code) {
        code = 0xE000;
    }
    char::from_u32(code)
}
