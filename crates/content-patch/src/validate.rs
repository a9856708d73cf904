//! Patch operation validator.
//!
//! Validates raw operations (as `serde_json::Value` maps) before decoding,
//! so callers can reject untrusted input early with a message naming the
//! failing operation.

use content_path::validate_patch_pointer;
use serde_json::{Map, Value};
use thiserror::Error;

/// Error returned by validation functions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

fn err(msg: &str) -> ValidationError {
    ValidationError(msg.to_string())
}

// ── Public API ─────────────────────────────────────────────────────────────

/// Validate a list of operations.
///
/// Errors include the index of the failing operation:
/// `"Error in operation [index = N] (reason)."`.
pub fn validate_operations(ops: &Value) -> Result<(), ValidationError> {
    let arr = ops.as_array().ok_or_else(|| err("Not an array."))?;
    if arr.is_empty() {
        return Err(err("Empty operation patch."));
    }
    for (i, op) in arr.iter().enumerate() {
        validate_operation(op).map_err(|e| {
            ValidationError(format!("Error in operation [index = {}] ({}).", i, e.0))
        })?;
    }
    Ok(())
}

/// Validate a single operation object.
pub fn validate_operation(op: &Value) -> Result<(), ValidationError> {
    let map = op.as_object().ok_or_else(|| err("OP_INVALID"))?;
    let path = map.get("path").ok_or_else(|| err("OP_PATH_INVALID"))?;
    validate_path_value(path, "OP_PATH_INVALID")?;

    let op_name = map.get("op").and_then(Value::as_str).unwrap_or("");
    match op_name {
        "add" | "replace" | "test" => validate_has_value(map),
        "remove" => Ok(()),
        "copy" => validate_from(map),
        "move" => validate_op_move(map, path),
        "file" => validate_op_file(map),
        "" => Err(err("OP_MISSING")),
        _ => Err(err("OP_UNKNOWN")),
    }
}

// ── Operation-specific validators ─────────────────────────────────────────

fn validate_op_move(map: &Map<String, Value>, path: &Value) -> Result<(), ValidationError> {
    validate_from(map)?;
    if let (Some(from), Some(path)) = (map.get("from").and_then(Value::as_str), path.as_str()) {
        if path.starts_with(&format!("{from}/")) {
            return Err(err("Cannot move into own children."));
        }
    }
    Ok(())
}

fn validate_op_file(map: &Map<String, Value>) -> Result<(), ValidationError> {
    let value = map.get("value").ok_or_else(|| err("OP_VALUE_MISSING"))?;
    let value = value.as_str().ok_or_else(|| err("File value must be a string."))?;
    if !value.starts_with("data:") {
        return Err(err("File value must be a data URL."));
    }
    match map.get("nestedPath") {
        None | Some(Value::Null) => Ok(()),
        Some(nested) => validate_path_value(nested, "OP_NESTED_PATH_INVALID"),
    }
}

// ── Field validators ───────────────────────────────────────────────────────

fn validate_has_value(map: &Map<String, Value>) -> Result<(), ValidationError> {
    if !map.contains_key("value") {
        return Err(err("OP_VALUE_MISSING"));
    }
    Ok(())
}

fn validate_from(map: &Map<String, Value>) -> Result<(), ValidationError> {
    let from = map.get("from").ok_or_else(|| err("OP_FROM_INVALID"))?;
    validate_path_value(from, "OP_FROM_INVALID")
}

/// Paths are patch path strings or arrays of string steps.
fn validate_path_value(v: &Value, code: &str) -> Result<(), ValidationError> {
    match v {
        Value::String(s) => validate_patch_pointer(s).map_err(|e| err(&e.to_string())),
        Value::Array(steps) if steps.iter().all(Value::is_string) => Ok(()),
        _ => Err(err(code)),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ops_not_array() {
        assert_eq!(validate_operations(&json!(123)), Err(err("Not an array.")));
    }

    #[test]
    fn ops_empty_array() {
        assert_eq!(validate_operations(&json!([])), Err(err("Empty operation patch.")));
    }

    #[test]
    fn ops_error_names_index() {
        let result = validate_operations(&json!([
            { "op": "add", "path": "/a", "value": 1 },
            { "op": "add", "path": "/b" }
        ]));
        assert_eq!(
            result,
            Err(err("Error in operation [index = 1] (OP_VALUE_MISSING)."))
        );
    }

    #[test]
    fn valid_ops() {
        validate_operations(&json!([
            { "op": "add", "path": "/a", "value": 1 },
            { "op": "remove", "path": "/a" },
            { "op": "replace", "path": "", "value": {} },
            { "op": "move", "from": "/a", "path": "/b" },
            { "op": "copy", "from": ["a"], "path": ["c"] },
            { "op": "test", "path": "/a", "value": null },
            { "op": "file", "path": "/img", "value": "data:image/png;base64,AA==" }
        ]))
        .unwrap();
    }

    #[test]
    fn path_must_start_with_slash() {
        let result = validate_operation(&json!({ "op": "remove", "path": "a" }));
        assert!(result.is_err());
    }

    #[test]
    fn unknown_op() {
        let result = validate_operation(&json!({ "op": "inc", "path": "/a", "inc": 1 }));
        assert_eq!(result, Err(err("OP_UNKNOWN")));
    }

    #[test]
    fn move_into_own_children() {
        let result = validate_operation(&json!({ "op": "move", "from": "/a", "path": "/a/b" }));
        assert_eq!(result, Err(err("Cannot move into own children.")));
    }

    #[test]
    fn file_value_must_be_data_url() {
        assert_eq!(
            validate_operation(&json!({ "op": "file", "path": "/a", "value": 1 })),
            Err(err("File value must be a string."))
        );
        assert_eq!(
            validate_operation(&json!({ "op": "file", "path": "/a", "value": "https://x" })),
            Err(err("File value must be a data URL."))
        );
        assert_eq!(
            validate_operation(&json!({
                "op": "file", "path": "/a", "value": "data:,", "nestedPath": 5
            })),
            Err(err("OP_NESTED_PATH_INVALID"))
        );
    }
}
