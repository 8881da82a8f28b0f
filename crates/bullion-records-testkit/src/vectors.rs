//! Golden record vectors.
//!
//! Each vector pins the exact bytes written to the ledger for one record, so
//! any change to field names, ordering or escaping shows up as a failure.

use bullion_records_core::{Record, RecordKey, RecordKind};

/// A golden record vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Record kind.
    pub kind: RecordKind,
    /// Generated identifier (without prefix).
    pub id: &'static str,
    /// Positional field values.
    pub values: &'static [&'static str],
    /// Expected stored JSON.
    pub expected_json: &'static str,
}

/// Get all golden record vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "Bar with legacy hallmark field name",
            kind: RecordKind::Bar,
            id: "v1",
            values: &["Vault-7", "SN-001", "999.9", "RefinerX", "true", "1000"],
            expected_json: concat!(
                r#"{"barHallmarkVerfied":"true","barLocation":"Vault-7","barRefiner":"RefinerX","#,
                r#""barSerialNumber":"SN-001","barWeightInGms":"1000","id":"Bar-v1","purity":"999.9"}"#
            ),
        },
        GoldenVector {
            name: "Buy with every field",
            kind: RecordKind::Buy,
            id: "v1",
            values: &["ORD-100", "5400", "5454", "quoted", "pending", "80.25", "user-1"],
            expected_json: concat!(
                r#"{"amount":"5400","amountWithFees":"5454","estimatedGrams":"80.25","id":"Buy-v1","#,
                r#""orderId":"ORD-100","paymentStatus":"pending","stage":"quoted","userId":"user-1"}"#
            ),
        },
        GoldenVector {
            name: "Sell with lowercase estimatedamount",
            kind: RecordKind::Sell,
            id: "v1",
            values: &["ORD-200", "12.5", "840", "user-2"],
            expected_json: r#"{"estimatedamount":"840","grams":"12.5","id":"Sell-v1","orderId":"ORD-200","userId":"user-2"}"#,
        },
        GoldenVector {
            name: "Send with escaped quotes",
            kind: RecordKind::Send,
            id: "v1",
            values: &["ORD-300", "3", "alice \"a\"", "bob"],
            expected_json: r#"{"grams":"3","id":"Send-v1","orderId":"ORD-300","receiverUserId":"bob","senderUserId":"alice \"a\""}"#,
        },
        GoldenVector {
            name: "Trade with non-ASCII text",
            kind: RecordKind::Trade,
            id: "v1",
            values: &["ORD-400", "0.75", "Zoë"],
            expected_json: r#"{"grams":"0.75","id":"Trade-v1","orderId":"ORD-400","userId":"Zoë"}"#,
        },
        GoldenVector {
            name: "Trade with empty text fields",
            kind: RecordKind::Trade,
            id: "0190b3c4-7e4f-7000-8000-000000000001",
            values: &["", "0", ""],
            expected_json: r#"{"grams":"0","id":"Trade-0190b3c4-7e4f-7000-8000-000000000001","orderId":"","userId":""}"#,
        },
    ]
}

/// Build the record a vector describes.
pub fn record_from_vector(vector: &GoldenVector) -> Record {
    let key = RecordKey::new(vector.kind, vector.id);
    Record::from_positional(&key, vector.values)
        .unwrap_or_else(|e| panic!("vector {:?} has wrong arity: {}", vector.name, e))
}

/// Verify all vectors. Returns (name, passed, actual JSON) per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let actual = record_from_vector(v)
                .to_json()
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .unwrap_or_else(|e| format!("<encoding failed: {}>", e));
            (v.name.to_string(), actual == v.expected_json, actual)
        })
        .collect()
}
