//! JSON codec for patch operations.
//!
//! Converts operations to/from `serde_json::Value` in RFC 6902 form plus the
//! `file` extension:
//!
//! ```json
//! { "op": "file", "path": "/image", "value": "data:image/png;base64,...", "nestedPath": "/image/_ref" }
//! ```
//!
//! Paths are written as patch path strings. On decode a path may also be
//! given as an array of string steps.

use content_path::{decode_patch_path_with, encode_patch_path_with, Path, PathEscaping};
use serde_json::{json, Map, Value};

use crate::types::{Op, PatchError};

// ── Path helpers ──────────────────────────────────────────────────────────

fn encode_path(path: &[String], escaping: PathEscaping) -> Value {
    Value::String(encode_patch_path_with(path, escaping))
}

fn decode_path(v: &Value, field: &str, escaping: PathEscaping) -> Result<Path, PatchError> {
    match v {
        Value::String(s) => {
            decode_patch_path_with(s, escaping).map_err(|e| PatchError::InvalidOp(e.to_string()))
        }
        Value::Array(steps) => steps
            .iter()
            .map(|step| {
                step.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| PatchError::InvalidOp(format!("{field} steps must be strings")))
            })
            .collect(),
        _ => Err(PatchError::InvalidOp(format!("{field} must be a string"))),
    }
}

fn field<'a>(map: &'a Map<String, Value>, name: &str) -> Result<&'a Value, PatchError> {
    map.get(name).ok_or_else(|| PatchError::InvalidOp(format!("missing field: {name}")))
}

// ── Serialization ─────────────────────────────────────────────────────────

/// Serialize an `Op` with raw (unescaped) paths.
pub fn to_json(op: &Op) -> Value {
    to_json_with(op, PathEscaping::Raw)
}

pub fn to_json_with(op: &Op, escaping: PathEscaping) -> Value {
    let p = |path: &Path| encode_path(path, escaping);
    match op {
        Op::Add { path, value } => json!({ "op": "add", "path": p(path), "value": value }),
        Op::Remove { path } => json!({ "op": "remove", "path": p(path) }),
        Op::Replace { path, value } => json!({ "op": "replace", "path": p(path), "value": value }),
        Op::Move { from, path } => json!({ "op": "move", "from": p(from), "path": p(path) }),
        Op::Copy { from, path } => json!({ "op": "copy", "from": p(from), "path": p(path) }),
        Op::Test { path, value } => json!({ "op": "test", "path": p(path), "value": value }),
        Op::File { path, value, nested_path } => {
            let mut m = Map::new();
            m.insert("op".into(), json!("file"));
            m.insert("path".into(), p(path));
            m.insert("value".into(), json!(value));
            if let Some(nested) = nested_path {
                m.insert("nestedPath".into(), p(nested));
            }
            Value::Object(m)
        }
    }
}

/// Serialize a list of operations.
pub fn to_json_patch(ops: &[Op]) -> Value {
    Value::Array(ops.iter().map(to_json).collect())
}

// ── Deserialization ───────────────────────────────────────────────────────

/// Deserialize a single operation from JSON, reading raw paths.
pub fn from_json(v: &Value) -> Result<Op, PatchError> {
    from_json_with(v, PathEscaping::Raw)
}

pub fn from_json_with(v: &Value, escaping: PathEscaping) -> Result<Op, PatchError> {
    let map = v.as_object().ok_or_else(|| PatchError::InvalidOp("op must be an object".into()))?;
    let op_name = field(map, "op")?
        .as_str()
        .ok_or_else(|| PatchError::InvalidOp("op must be a string".into()))?;
    let path = decode_path(field(map, "path")?, "path", escaping)?;
    let from = || decode_path(field(map, "from")?, "from", escaping);
    let value = || field(map, "value").cloned();

    match op_name {
        "add" => Ok(Op::Add { path, value: value()? }),
        "remove" => Ok(Op::Remove { path }),
        "replace" => Ok(Op::Replace { path, value: value()? }),
        "move" => Ok(Op::Move { from: from()?, path }),
        "copy" => Ok(Op::Copy { from: from()?, path }),
        "test" => Ok(Op::Test { path, value: value()? }),
        "file" => {
            let value = field(map, "value")?
                .as_str()
                .ok_or_else(|| PatchError::InvalidOp("file value must be a string".into()))?
                .to_string();
            let nested_path = match map.get("nestedPath") {
                None | Some(Value::Null) => None,
                Some(nested) => Some(decode_path(nested, "nestedPath", escaping)?),
            };
            Ok(Op::File { path, value, nested_path })
        }
        other => Err(PatchError::InvalidOp(format!("unknown op: {other}"))),
    }
}

/// Deserialize a JSON array of operations.
pub fn from_json_patch(v: &Value) -> Result<Vec<Op>, PatchError> {
    from_json_patch_with(v, PathEscaping::Raw)
}

pub fn from_json_patch_with(v: &Value, escaping: PathEscaping) -> Result<Vec<Op>, PatchError> {
    let arr = v.as_array().ok_or_else(|| PatchError::InvalidOp("patch must be an array".into()))?;
    arr.iter().map(|op| from_json_with(op, escaping)).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn path(steps: &[&str]) -> Path {
        steps.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn encodes_rfc6902_objects() {
        let op = Op::Move { from: path(&["a", "0"]), path: path(&["a", "2"]) };
        assert_eq!(to_json(&op), json!({ "op": "move", "from": "/a/0", "path": "/a/2" }));
        assert_eq!(from_json(&to_json(&op)).unwrap(), op);
    }

    #[test]
    fn root_path_is_empty_string() {
        let op = Op::Replace { path: vec![], value: json!({ "a": 1 }) };
        assert_eq!(to_json(&op)["path"], json!(""));
        assert_eq!(from_json(&json!({ "op": "remove", "path": "/" })).unwrap(), Op::Remove {
            path: path(&[""])
        });
    }

    #[test]
    fn accepts_step_arrays() {
        let op = from_json(&json!({ "op": "replace", "path": ["title"], "value": "B" })).unwrap();
        assert_eq!(op, Op::Replace { path: path(&["title"]), value: json!("B") });
        assert_eq!(to_json(&op)["path"], json!("/title"));
    }

    #[test]
    fn file_op_with_nested_path() {
        let raw = json!({
            "op": "file",
            "path": "/cover",
            "value": "data:image/png;base64,AAAA",
            "nestedPath": "/gallery/0"
        });
        let op = from_json(&raw).unwrap();
        assert_eq!(
            op,
            Op::File {
                path: path(&["cover"]),
                value: "data:image/png;base64,AAAA".into(),
                nested_path: Some(path(&["gallery", "0"])),
            }
        );
        assert_eq!(to_json(&op), raw);
    }

    #[test]
    fn rfc6901_escaping() {
        let op = Op::Remove { path: path(&["a/b", "c~d"]) };
        let raw = to_json_with(&op, PathEscaping::Rfc6901);
        assert_eq!(raw["path"], json!("/a~1b/c~0d"));
        assert_eq!(from_json_with(&raw, PathEscaping::Rfc6901).unwrap(), op);
    }

    #[test]
    fn rejects_unknown_ops_and_missing_fields() {
        assert!(matches!(
            from_json(&json!({ "op": "inc", "path": "/a" })),
            Err(PatchError::InvalidOp(_))
        ));
        assert!(matches!(
            from_json(&json!({ "op": "add", "path": "/a" })),
            Err(PatchError::InvalidOp(msg)) if msg == "missing field: value"
        ));
        assert!(from_json(&json!({ "op": "move", "path": "/a" })).is_err());
        assert!(from_json(&json!({ "op": "remove", "path": "a" })).is_err());
    }
}
