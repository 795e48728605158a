//! Schemaless documents as persisted in the document store.

/// A stored item: a JSON object whose shape is owned by the store.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Read a string attribute from a document.
#[must_use]
pub fn string_attribute<'a>(document: &'a Document, name: &str) -> Option<&'a str> {
    document.get(name).and_then(serde_json::Value::as_str)
}
