//! Record kinds and their schemas.
//!
//! Every kind is described by a static [`KindSchema`]: the key prefix under
//! which its records live and the ordered list of caller-supplied fields.
//! The generic store consults the schema instead of carrying one code path
//! per kind.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// JSON name of the generated primary identifier carried by every record.
pub const ID_FIELD: &str = "id";

/// Separator between a kind prefix and the generated identifier.
pub const KEY_SEPARATOR: char = '-';

/// Discriminator for the schema a record follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordKind {
    /// A physical bullion bar held in a vault.
    Bar,
    /// A purchase order.
    Buy,
    /// A sell order.
    Sell,
    /// A transfer between two users.
    Send,
    /// A trade settlement.
    Trade,
}

impl RecordKind {
    /// All kinds, in declaration order.
    pub const ALL: [RecordKind; 5] = [
        RecordKind::Bar,
        RecordKind::Buy,
        RecordKind::Sell,
        RecordKind::Send,
        RecordKind::Trade,
    ];

    /// The kind's name as used in routes and logs.
    pub fn name(self) -> &'static str {
        self.schema().name
    }

    /// The key prefix under which records of this kind are stored.
    pub fn prefix(self) -> &'static str {
        self.schema().prefix
    }

    /// The static schema for this kind.
    pub fn schema(self) -> &'static KindSchema {
        match self {
            RecordKind::Bar => &BAR,
            RecordKind::Buy => &BUY,
            RecordKind::Sell => &SELL,
            RecordKind::Send => &SEND,
            RecordKind::Trade => &TRADE,
        }
    }

    /// Number of caller-supplied fields (the generated `id` excluded).
    pub fn field_count(self) -> usize {
        self.schema().fields.len()
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RecordKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownKind(s.to_string()))
    }
}

/// How a field's string value is checked at the boundary.
///
/// Values are always persisted as strings; the type only governs input
/// validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Free-form text, including the empty string.
    Text,
    /// A non-negative decimal quantity such as grams or an amount.
    Quantity,
    /// A boolean flag spelled `true` or `false`.
    Flag,
}

/// A single caller-supplied field of a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// The wire name of the field in the persisted JSON object.
    pub json_name: &'static str,
    /// The validation applied to incoming values.
    pub ty: FieldType,
}

const fn text(json_name: &'static str) -> FieldSpec {
    FieldSpec {
        json_name,
        ty: FieldType::Text,
    }
}

const fn quantity(json_name: &'static str) -> FieldSpec {
    FieldSpec {
        json_name,
        ty: FieldType::Quantity,
    }
}

const fn flag(json_name: &'static str) -> FieldSpec {
    FieldSpec {
        json_name,
        ty: FieldType::Flag,
    }
}

/// Static description of a record kind.
#[derive(Debug, PartialEq, Eq)]
pub struct KindSchema {
    /// The kind this schema describes.
    pub kind: RecordKind,
    /// Route and log name.
    pub name: &'static str,
    /// Key prefix; keys look like `<prefix>-<id>`.
    pub prefix: &'static str,
    /// Caller-supplied fields in positional order.
    pub fields: &'static [FieldSpec],
}

impl KindSchema {
    /// Look up a field by its wire name.
    pub fn field(&self, json_name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.json_name == json_name)
    }

    /// Iterate the wire names in positional order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.json_name)
    }
}

static BAR: KindSchema = KindSchema {
    kind: RecordKind::Bar,
    name: "Bar",
    prefix: "Bar",
    fields: &[
        text("barLocation"),
        text("barSerialNumber"),
        quantity("purity"),
        text("barRefiner"),
        // Wire name kept as deployed clients read it.
        flag("barHallmarkVerfied"),
        quantity("barWeightInGms"),
    ],
};

static BUY: KindSchema = KindSchema {
    kind: RecordKind::Buy,
    name: "Buy",
    prefix: "Buy",
    fields: &[
        text("orderId"),
        quantity("amount"),
        quantity("amountWithFees"),
        text("stage"),
        text("paymentStatus"),
        quantity("estimatedGrams"),
        text("userId"),
    ],
};

static SELL: KindSchema = KindSchema {
    kind: RecordKind::Sell,
    name: "Sell",
    prefix: "Sell",
    fields: &[
        text("orderId"),
        quantity("grams"),
        quantity("estimatedamount"),
        text("userId"),
    ],
};

static SEND: KindSchema = KindSchema {
    kind: RecordKind::Send,
    name: "Send",
    prefix: "Send",
    fields: &[
        text("orderId"),
        quantity("grams"),
        text("senderUserId"),
        text("receiverUserId"),
    ],
};

static TRADE: KindSchema = KindSchema {
    kind: RecordKind::Trade,
    name: "Trade",
    prefix: "Trade",
    fields: &[text("orderId"), quantity("grams"), text("userId")],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_counts() {
        assert_eq!(RecordKind::Bar.field_count(), 6);
        assert_eq!(RecordKind::Buy.field_count(), 7);
        assert_eq!(RecordKind::Sell.field_count(), 4);
        assert_eq!(RecordKind::Send.field_count(), 4);
        assert_eq!(RecordKind::Trade.field_count(), 3);
    }

    #[test]
    fn test_schema_matches_kind() {
        for kind in RecordKind::ALL {
            assert_eq!(kind.schema().kind, kind);
        }
    }

    #[test]
    fn test_prefixes_do_not_nest() {
        // A prefix that is itself a prefix of another would leak records
        // across kinds during range scans.
        for a in RecordKind::ALL {
            for b in RecordKind::ALL {
                if a != b {
                    let scoped = format!("{}{}", a.prefix(), KEY_SEPARATOR);
                    assert!(!b.prefix().starts_with(&scoped));
                }
            }
        }
    }

    #[test]
    fn test_no_field_shadows_id() {
        for kind in RecordKind::ALL {
            assert!(kind.schema().field(ID_FIELD).is_none());
        }
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("Bar".parse::<RecordKind>().unwrap(), RecordKind::Bar);
        assert_eq!("trade".parse::<RecordKind>().unwrap(), RecordKind::Trade);
        assert!(matches!(
            "Gold".parse::<RecordKind>(),
            Err(CoreError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(RecordKind::Send.to_string(), "Send");
    }
}
