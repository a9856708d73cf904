//! Generate a patch from two document values.
//!
//! The diff is structural: objects compare key by key, arrays compare index
//! by index, and anything else that differs is replaced. Only `add`,
//! `remove` and `replace` operations are produced.

use content_path::prefix_path;
use content_schema::{RichText, RichTextError};
use serde_json::{Map, Value};

use crate::types::Op;

// ── Public API ────────────────────────────────────────────────────────────

/// Generate the operations that transform `before` into `after`, with
/// `base_path` prepended to every path.
pub fn generate_patch(before: &Value, after: &Value, base_path: &[String]) -> Vec<Op> {
    let mut ops = Vec::new();
    diff_at_path(&mut ops, base_path, before, after);
    ops
}

/// Prepend `base_path` to every path of `ops`.
pub fn prefix_ops(ops: &[Op], base_path: &[String]) -> Vec<Op> {
    ops.iter().map(|op| op.prefixed(base_path)).collect()
}

/// Diff two rich text values and address the result at `base_path`.
pub fn richtext_patch(
    before: &RichText,
    after: &RichText,
    base_path: &[String],
) -> Result<Vec<Op>, RichTextError> {
    Ok(generate_patch(&before.to_source()?, &after.to_source()?, base_path))
}

// ── Core recursive differ ─────────────────────────────────────────────────

fn diff_at_path(ops: &mut Vec<Op>, path: &[String], src: &Value, dst: &Value) {
    if src == dst {
        return;
    }
    match (src, dst) {
        (Value::Object(s), Value::Object(d)) => diff_obj(ops, path, s, d),
        (Value::Array(s), Value::Array(d)) => diff_arr(ops, path, s, d),
        _ => ops.push(Op::Replace { path: path.to_vec(), value: dst.clone() }),
    }
}

fn child(path: &[String], step: impl Into<String>) -> Vec<String> {
    prefix_path(path, &[step.into()])
}

fn diff_obj(ops: &mut Vec<Op>, path: &[String], src: &Map<String, Value>, dst: &Map<String, Value>) {
    // Walk the old keys first: recurse into kept ones, drop the rest.
    for (key, src_val) in src {
        let p = child(path, key.clone());
        match dst.get(key) {
            Some(dst_val) => diff_at_path(ops, &p, src_val, dst_val),
            None => ops.push(Op::Remove { path: p }),
        }
    }
    for (key, dst_val) in dst {
        if !src.contains_key(key) {
            ops.push(Op::Add { path: child(path, key.clone()), value: dst_val.clone() });
        }
    }
}

fn diff_arr(ops: &mut Vec<Op>, path: &[String], src: &[Value], dst: &[Value]) {
    // Remove from the end so earlier indices stay valid.
    for i in (dst.len()..src.len()).rev() {
        ops.push(Op::Remove { path: child(path, i.to_string()) });
    }
    for (i, (src_val, dst_val)) in src.iter().zip(dst).enumerate() {
        diff_at_path(ops, &child(path, i.to_string()), src_val, dst_val);
    }
    for (i, dst_val) in dst.iter().enumerate().skip(src.len()) {
        ops.push(Op::Add { path: child(path, i.to_string()), value: dst_val.clone() });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
