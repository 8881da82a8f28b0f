//! Boundary validation for caller-supplied field values.
//!
//! Quantities and flags travel as strings on the wire. They are parsed here
//! into [`Quantity`] and [`Flag`] so malformed amounts never reach the
//! ledger, while the persisted form stays the caller's original text.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::kind::{FieldSpec, FieldType, RecordKind};

/// A non-negative decimal quantity (grams, amounts, purity).
///
/// Keeps the caller's spelling so `"999.9"` is stored as `"999.9"`, never
/// re-rendered through a float.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantity {
    text: String,
    integer_digits: usize,
}

impl Quantity {
    /// The original text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The integer part, without fractional digits.
    pub fn integer_part(&self) -> &str {
        &self.text[..self.integer_digits]
    }

    /// The fractional part, empty when the quantity is whole.
    pub fn fractional_part(&self) -> &str {
        self.text
            .get(self.integer_digits + 1..)
            .unwrap_or_default()
    }
}

impl FromStr for Quantity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (int, frac) = match s.split_once('.') {
            Some((int, frac)) => (int, Some(frac)),
            None => (s, None),
        };
        if int.is_empty() {
            return Err("missing integer digits".into());
        }
        if !int.bytes().all(|b| b.is_ascii_digit()) {
            return Err("expected a non-negative decimal number".into());
        }
        if let Some(frac) = frac {
            if frac.is_empty() {
                return Err("missing fractional digits".into());
            }
            if !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err("expected a non-negative decimal number".into());
            }
        }
        Ok(Self {
            text: s.to_string(),
            integer_digits: int.len(),
        })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A boolean flag spelled exactly `true` or `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flag(pub bool);

impl FromStr for Flag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" => Ok(Flag(true)),
            "false" => Ok(Flag(false)),
            _ => Err("expected true or false".into()),
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Check that an operation received exactly `expected` positional values.
pub fn check_arity(operation: &str, expected: usize, got: usize) -> Result<(), ValidationError> {
    if expected != got {
        return Err(ValidationError::ArgumentCount {
            operation: operation.to_string(),
            expected,
            got,
        });
    }
    Ok(())
}

/// Validate one value against its field spec.
pub fn validate_value(
    kind: RecordKind,
    spec: &FieldSpec,
    value: &str,
) -> Result<(), ValidationError> {
    let outcome = match spec.ty {
        FieldType::Text => Ok(()),
        FieldType::Quantity => value.parse::<Quantity>().map(|_| ()),
        FieldType::Flag => value.parse::<Flag>().map(|_| ()),
    };
    outcome.map_err(|reason| ValidationError::InvalidField {
        kind,
        field: spec.json_name,
        value: value.to_string(),
        reason,
    })
}

/// Validate a full positional value list for `kind`.
///
/// Checks arity first, then each value in declaration order; the first
/// failure wins.
pub fn validate_fields<S: AsRef<str>>(
    kind: RecordKind,
    values: &[S],
) -> Result<(), ValidationError> {
    let schema = kind.schema();
    check_arity(
        &format!("create{}", kind.name()),
        schema.fields.len(),
        values.len(),
    )?;
    for (spec, value) in schema.fields.iter().zip(values) {
        validate_value(kind, spec, value.as_ref())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_quantity_accepts_decimals() {
        for ok in ["0", "1000", "999.9", "0.001", "007"] {
            assert!(ok.parse::<Quantity>().is_ok(), "{ok} should parse");
        }
        let q: Quantity = "999.9".parse().unwrap();
        assert_eq!(q.integer_part(), "999");
        assert_eq!(q.fractional_part(), "9");
        assert_eq!(q.to_string(), "999.9");

        let whole: Quantity = "1000".parse().unwrap();
        assert_eq!(whole.fractional_part(), "");
    }

    #[test]
    fn test_quantity_rejects_garbage() {
        for bad in ["", "-1", "1.", ".5", "1.2.3", "1e3", "ten", " 1", "1,000"] {
            assert!(bad.parse::<Quantity>().is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn test_flag() {
        assert_eq!("true".parse::<Flag>().unwrap(), Flag(true));
        assert_eq!("false".parse::<Flag>().unwrap(), Flag(false));
        assert!("True".parse::<Flag>().is_err());
        assert!("1".parse::<Flag>().is_err());
    }

    #[test]
    fn test_validate_fields_bar() {
        let values = ["Vault-7", "SN-001", "999.9", "RefinerX", "true", "1000"];
        validate_fields(RecordKind::Bar, &values).unwrap();
    }

    #[test]
    fn test_validate_fields_arity() {
        let err = validate_fields(RecordKind::Trade, &["ORD-1", "5"]).unwrap_err();
        match err {
            ValidationError::ArgumentCount {
                operation,
                expected,
                got,
            } => {
                assert_eq!(operation, "createTrade");
                assert_eq!(expected, 3);
                assert_eq!(got, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_fields_reports_first_bad_field() {
        let values = ["ORD-1", "lots", "also-bad", "user-1"];
        let err = validate_fields(RecordKind::Sell, &values).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidField { field: "grams", .. }
        ));
    }

    proptest! {
        #[test]
        fn test_quantity_accepts_digit_forms(int in "[0-9]{1,12}", frac in proptest::option::of("[0-9]{1,6}")) {
            let text = match &frac {
                Some(frac) => format!("{int}.{frac}"),
                None => int.clone(),
            };
            let q: Quantity = text.parse().unwrap();
            prop_assert_eq!(q.integer_part(), int.as_str());
            prop_assert_eq!(q.as_str(), text.as_str());
        }

        #[test]
        fn test_quantity_rejects_foreign_chars(head in "[0-9]{0,4}", bad in "[^0-9.]", tail in "[0-9]{0,4}") {
            let text = format!("{head}{bad}{tail}");
            prop_assert!(text.parse::<Quantity>().is_err());
        }
    }
}
