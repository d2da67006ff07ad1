//! JSON formatting
//!
//! Pretty bodies are re-serialized with sorted keys and a three space
//! indent. BSON documents are converted to relaxed extended JSON first and
//! then go through the same path.

use bson::{Bson, Document};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value as JsonValue;

use crate::errors::CurlError;

/// Indentation unit for pretty JSON
pub const JSON_INDENT: &[u8] = b"   ";

/// Maximum recursion depth for JSON key sorting to prevent stack overflow
const MAX_JSON_DEPTH: usize = 128;

/// Re-indent a JSON document; the result ends with a newline
pub fn format_json(body: &[u8]) -> Result<String, CurlError> {
    let value: JsonValue = serde_json::from_slice(body)
        .map_err(|e| CurlError::Decode(format!("invalid json: {}", e)))?;
    format_value(&value)
}

/// Decode one BSON document and render it as pretty JSON
pub fn format_bson(body: &[u8]) -> Result<String, CurlError> {
    let mut reader = body;
    let document = Document::from_reader(&mut reader)
        .map_err(|e| CurlError::Decode(format!("invalid bson: {}", e)))?;
    format_value(&Bson::Document(document).into_relaxed_extjson())
}

/// Serialize `value` with sorted keys and [`JSON_INDENT`]
pub fn format_value(value: &JsonValue) -> Result<String, CurlError> {
    let sorted = sort_json_keys(value);
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(JSON_INDENT));
    sorted
        .serialize(&mut serializer)
        .map_err(|e| CurlError::Decode(format!("JSON formatting error: {}", e)))?;
    buf.push(b'\n');
    String::from_utf8(buf).map_err(|e| CurlError::Decode(format!("UTF-8 error: {}", e)))
}

/// Sort JSON object keys recursively with depth limit
fn sort_json_keys(value: &JsonValue) -> JsonValue {
    sort_json_keys_with_depth(value, 0)
}

fn sort_json_keys_with_depth(value: &JsonValue, depth: usize) -> JsonValue {
    if depth >= MAX_JSON_DEPTH {
        return value.clone();
    }

    match value {
        JsonValue::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));

            let sorted_map: serde_json::Map<String, JsonValue> = sorted
                .into_iter()
                .map(|(k, v)| (k.clone(), sort_json_keys_with_depth(v, depth + 1)))
                .collect();

            JsonValue::Object(sorted_map)
        }
        JsonValue::Array(arr) => {
            JsonValue::Array(arr.iter().map(|v| sort_json_keys_with_depth(v, depth + 1)).collect())
        }
        _ => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_simple_object() {
        assert_eq!(format_json(br#"{"a":1}"#).unwrap(), "{\n   \"a\": 1\n}\n");
    }

    #[test]
    fn test_keys_sorted_recursively() {
        let out = format_json(br#"{"b":{"y":1,"x":2},"a":[3]}"#).unwrap();
        let expected = "{\n   \"a\": [\n      3\n   ],\n   \"b\": {\n      \"x\": 2,\n      \"y\": 1\n   }\n}\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_empty_containers_stay_compact() {
        assert_eq!(format_json(br#"{"a":{},"b":[]}"#).unwrap(), "{\n   \"a\": {},\n   \"b\": []\n}\n");
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(format_json(b"{not json"), Err(CurlError::Decode(_))));
    }

    #[test]
    fn test_bson_document() {
        let mut bytes = Vec::new();
        doc! { "name": "rcurl", "count": 3_i32 }.to_writer(&mut bytes).unwrap();
        let out = format_bson(&bytes).unwrap();
        assert_eq!(out, "{\n   \"count\": 3,\n   \"name\": \"rcurl\"\n}\n");
    }

    #[test]
    fn test_truncated_bson() {
        assert!(matches!(format_bson(&[0x10, 0x00]), Err(CurlError::Decode(_))));
    }
}
