//! Deterministic rendering and comparison of database documents.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Serializer, Value};
use similar::TextDiff;

const TIMESTAMP_KEY: &str = "timestamp";

/// Serializes with four-space indentation.
///
/// Keys come out sorted provided `value` serializes its maps sorted, which
/// holds for every document type in this workspace and for [`canonical`]
/// values.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut output = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut output, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer).or_raise(|| ErrorKind::Serialize)?;
    String::from_utf8(output).or_raise(|| ErrorKind::Serialize)
}

/// Rebuilds every object with its keys in sorted order.
pub fn canonical(value: Value) -> Value {
    match value {
        Value::Object(object) => {
            let mut entries: Vec<_> = object.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(entries.into_iter().map(|(key, value)| (key, canonical(value))).collect::<Map<_, _>>())
        },
        Value::Array(items) => Value::Array(items.into_iter().map(canonical).collect()),
        other => other,
    }
}

/// The comparable form of a database document: canonical, with the timestamp
/// zeroed.
///
/// Any object gets a zero timestamp, including the empty document standing in
/// for a database that was never published.
pub fn normalized(mut value: Value) -> Value {
    if let Value::Object(object) = &mut value {
        object.insert(TIMESTAMP_KEY.to_string(), Value::from(0));
    }
    canonical(value)
}

/// Line-based unified diff from `old` to `new`.
pub fn unified_diff(old: &str, new: &str) -> String {
    TextDiff::from_lines(old, new).unified_diff().context_radius(3).header("published", "synthesized").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pretty_json_indents_four_spaces() {
        let rendered = to_pretty_json(&json!({"a": {"b": 1}})).unwrap();
        assert_eq!(rendered, "{\n    \"a\": {\n        \"b\": 1\n    }\n}");
    }

    #[test]
    fn test_normalized_ignores_timestamp_and_key_order() {
        let old = normalized(json!({"timestamp": 1, "files": {"b": 1, "a": 2}}));
        let new = normalized(json!({"files": {"a": 2, "b": 1}, "timestamp": 99}));
        assert_eq!(to_pretty_json(&old).unwrap(), to_pretty_json(&new).unwrap());
    }

    #[test]
    fn test_empty_document_gains_timestamp() {
        assert_eq!(normalized(json!({})), json!({"timestamp": 0}));
    }

    #[test]
    fn test_canonical_sorts_nested_keys() {
        let rendered = to_pretty_json(&canonical(json!({"z": [{"y": 1, "x": 2}], "a": null}))).unwrap();
        assert!(rendered.find("\"a\"").unwrap() < rendered.find("\"z\"").unwrap());
        assert!(rendered.find("\"x\"").unwrap() < rendered.find("\"y\"").unwrap());
    }

    #[test]
    fn test_unified_diff() {
        let diff = unified_diff("a\nb\nc\n", "a\nB\nc\n");
        assert!(diff.starts_with("--- published\n+++ synthesized\n@@"));
        assert!(diff.contains("\n-b\n"));
        assert!(diff.contains("\n+B\n"));
        assert!(unified_diff("same\n", "same\n").is_empty());
    }
}
