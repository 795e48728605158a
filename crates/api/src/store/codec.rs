//! JSON <-> DynamoDB attribute value marshalling.
//!
//! Mirrors what a DynamoDB document client does: strings become `S`, numbers
//! `N`, booleans `BOOL`, null `NULL`, arrays `L` and objects `M`. Set types
//! read back as arrays and binary values as standard base64 strings.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Number, Value};

use mini_shop_core::Document;

use super::{Result, StoreError};

/// Convert a JSON value into an attribute value.
#[must_use]
fn value_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(value_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(document_to_item(map)),
    }
}

/// Convert a JSON document into a DynamoDB item.
#[must_use]
pub fn document_to_item(document: &Document) -> HashMap<String, AttributeValue> {
    document
        .iter()
        .map(|(name, value)| (name.clone(), value_to_attribute(value)))
        .collect()
}

/// Convert an attribute value into JSON.
///
/// # Errors
///
/// Returns `StoreError::Codec` for malformed numbers or attribute types this
/// SDK version does not know.
fn attribute_to_value(attribute: &AttributeValue) -> Result<Value> {
    Ok(match attribute {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => Value::Number(parse_number(n)?),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(items) => Value::Array(
            items
                .iter()
                .map(attribute_to_value)
                .collect::<Result<Vec<_>>>()?,
        ),
        AttributeValue::M(map) => Value::Object(item_to_document(map)?),
        AttributeValue::Ss(set) => Value::Array(set.iter().cloned().map(Value::String).collect()),
        AttributeValue::Ns(set) => Value::Array(
            set.iter()
                .map(|n| parse_number(n).map(Value::Number))
                .collect::<Result<Vec<_>>>()?,
        ),
        AttributeValue::B(blob) => Value::String(STANDARD.encode(blob.as_ref())),
        AttributeValue::Bs(blobs) => Value::Array(
            blobs
                .iter()
                .map(|blob| Value::String(STANDARD.encode(blob.as_ref())))
                .collect(),
        ),
        other => {
            return Err(StoreError::Codec(format!(
                "unsupported attribute value: {other:?}"
            )));
        }
    })
}

/// Convert a DynamoDB item into a JSON document.
///
/// # Errors
///
/// Returns `StoreError::Codec` if any attribute cannot be converted.
pub fn item_to_document(item: &HashMap<String, AttributeValue>) -> Result<Document> {
    item.iter()
        .map(|(name, attribute)| Ok((name.clone(), attribute_to_value(attribute)?)))
        .collect()
}

/// Parse a DynamoDB number string into a JSON number.
fn parse_number(raw: &str) -> Result<Number> {
    if let Ok(n) = raw.parse::<i64>() {
        return Ok(Number::from(n));
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Ok(Number::from(n));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| StoreError::Codec(format!("invalid number '{raw}'")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aws_sdk_dynamodb::primitives::Blob;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_product_round_trip() {
        let product = json!({
            "id": "p1",
            "name": "Masala Chai",
            "price": 249.5,
            "image": "https://cdn.example.com/chai.jpg",
            "tags": ["tea", "spiced"],
            "inStock": true,
            "discontinued": null,
            "dimensions": {"grams": 250}
        });
        let doc = product.as_object().cloned().unwrap();

        let item = document_to_item(&doc);
        assert_eq!(item.get("id"), Some(&AttributeValue::S("p1".to_string())));
        assert_eq!(
            item.get("price"),
            Some(&AttributeValue::N("249.5".to_string()))
        );
        assert_eq!(item.get("inStock"), Some(&AttributeValue::Bool(true)));
        assert_eq!(item.get("discontinued"), Some(&AttributeValue::Null(true)));

        let back = item_to_document(&item).unwrap();
        assert_eq!(Value::Object(back), product);
    }

    #[test]
    fn test_integer_numbers_stay_integers() {
        let value = attribute_to_value(&AttributeValue::N("1299".to_string())).unwrap();
        assert_eq!(value, json!(1299));
        assert!(value.is_i64());
    }

    #[test]
    fn test_sets_read_as_arrays() {
        let strings = AttributeValue::Ss(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(attribute_to_value(&strings).unwrap(), json!(["a", "b"]));

        let numbers = AttributeValue::Ns(vec!["1".to_string(), "2.5".to_string()]);
        assert_eq!(attribute_to_value(&numbers).unwrap(), json!([1, 2.5]));
    }

    #[test]
    fn test_binary_reads_as_base64() {
        let blob = AttributeValue::B(Blob::new(b"hi".to_vec()));
        assert_eq!(attribute_to_value(&blob).unwrap(), json!("aGk="));
    }

    #[test]
    fn test_invalid_number() {
        let err = attribute_to_value(&AttributeValue::N("twelve".to_string())).unwrap_err();
        assert!(matches!(err, StoreError::Codec(_)));
    }
}
