//! Query-string encoding for GET filters.

use serde::Serialize;
use serde_json::Value;

use crate::error::HttpError;

/// Encode a filter into `a=1&b=x&b=y`.
///
/// - scalars are written as-is
/// - arrays repeat the key once per element
/// - objects are JSON-encoded, then percent-escaped
/// - nulls are skipped
///
/// Keys are emitted in sorted order. Anything that is not a JSON object
/// encodes to the empty string.
pub fn encode_query<Q: Serialize + ?Sized>(filter: &Q) -> Result<String, HttpError> {
    let value = serde_json::to_value(filter).map_err(|e| HttpError::Serialize(e.to_string()))?;
    let Value::Object(map) = value else {
        return Ok(String::new());
    };

    let mut entries: Vec<(String, Value)> = map.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut pairs: Vec<(String, String)> = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(v) = scalar(item) {
                        pairs.push((key.clone(), v));
                    }
                }
            }
            other => {
                if let Some(v) = scalar(other) {
                    pairs.push((key, v));
                }
            }
        }
    }

    serde_urlencoded::to_string(&pairs).map_err(|e| HttpError::Serialize(e.to_string()))
}

fn scalar(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}
