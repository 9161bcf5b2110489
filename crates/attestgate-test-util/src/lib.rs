//! Shared test utilities for the attestgate workspace.
//!
//! This crate exists because `xtask` needs `normalize_nondeterministic` at
//! runtime (not behind `#[cfg(test)]`), so a `#[cfg(test)]` module inside
//! `attestgate-types` would not suffice.

use serde_json::Value;

const TIMESTAMP_KEYS: [&str; 2] = ["started_at", "finished_at"];

/// Normalize non-deterministic report fields for golden-file comparison.
///
/// Only the root envelope is touched: `tool.version` becomes `"__VERSION__"` and both
/// timestamps become `"__TIMESTAMP__"`. An object counts as an envelope when it has
/// `schema`, `tool`, `verdict`, and `reasons`. Attestation-shaped data nested deeper is
/// left alone.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    let Some(obj) = value.as_object_mut() else {
        return value;
    };
    let is_envelope = obj.contains_key("schema")
        && obj.contains_key("tool")
        && obj.contains_key("verdict")
        && obj.contains_key("reasons");
    if !is_envelope {
        return value;
    }

    if let Some(tool_obj) = obj.get_mut("tool").and_then(Value::as_object_mut)
        && tool_obj.contains_key("version")
    {
        tool_obj.insert(
            "version".to_string(),
            Value::String("__VERSION__".to_string()),
        );
    }
    for key in TIMESTAMP_KEYS {
        if obj.contains_key(key) {
            obj.insert(key.to_string(), Value::String("__TIMESTAMP__".to_string()));
        }
    }
    value
}

/// Replace a temp-directory prefix in every string with `"<ROOT>"`.
pub fn redact_root(value: Value, root: &str) -> Value {
    match value {
        Value::String(s) => Value::String(s.replace(root, "<ROOT>")),
        Value::Array(arr) => Value::Array(arr.into_iter().map(|v| redact_root(v, root)).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, redact_root(v, root)))
                .collect(),
        ),
        other => other,
    }
}
