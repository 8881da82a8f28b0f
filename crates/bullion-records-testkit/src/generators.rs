//! Proptest generators for property-based testing.

use proptest::prelude::*;

use bullion_records_core::{FieldType, RecordKind};

/// Generate a record kind.
pub fn record_kind() -> impl Strategy<Value = RecordKind> {
    prop_oneof![
        Just(RecordKind::Bar),
        Just(RecordKind::Buy),
        Just(RecordKind::Sell),
        Just(RecordKind::Send),
        Just(RecordKind::Trade),
    ]
}

/// Generate a valid quantity: an integer or a decimal with digits on both sides.
pub fn quantity() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,9}".prop_map(String::from),
        "[0-9]{1,6}\\.[0-9]{1,4}".prop_map(String::from),
    ]
}

/// Generate text that is not a valid quantity.
pub fn invalid_quantity() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(".5".to_string()),
        Just("5.".to_string()),
        Just("1.2.3".to_string()),
        Just("-1".to_string()),
        "[a-z]{1,8}".prop_map(String::from),
    ]
}

/// Generate a valid flag.
pub fn flag() -> impl Strategy<Value = String> {
    any::<bool>().prop_map(|b| b.to_string())
}

/// Generate free text, including characters that need JSON escaping.
pub fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z0-9-]{0,16}".prop_map(String::from),
        "\\PC{0,24}".prop_map(String::from),
        Just("quote \" and \\ backslash".to_string()),
    ]
}

/// Generate a value valid for a field of type `ty`.
pub fn field_value(ty: FieldType) -> BoxedStrategy<String> {
    match ty {
        FieldType::Text => text().boxed(),
        FieldType::Quantity => quantity().boxed(),
        FieldType::Flag => flag().boxed(),
    }
}

/// Generate a full, valid positional value list for `kind`.
pub fn field_values(kind: RecordKind) -> impl Strategy<Value = Vec<String>> {
    kind.schema()
        .fields
        .iter()
        .map(|spec| field_value(spec.ty))
        .collect::<Vec<_>>()
}

/// Generate a value list whose length differs from `kind`'s field count.
pub fn wrong_arity_values(kind: RecordKind) -> impl Strategy<Value = Vec<String>> {
    let expected = kind.field_count();
    prop::collection::vec("[a-z0-9]{1,6}", 0..=expected + 3)
        .prop_filter("arity must differ", move |values| values.len() != expected)
}

/// Parameters for creating one record.
#[derive(Debug, Clone)]
pub struct CreateParams {
    pub kind: RecordKind,
    pub values: Vec<String>,
}

impl Arbitrary for CreateParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        record_kind()
            .prop_flat_map(|kind| {
                field_values(kind).prop_map(move |values| CreateParams { kind, values })
            })
            .boxed()
    }
}
