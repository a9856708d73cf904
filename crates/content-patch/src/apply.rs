//! Reference patch applier.
//!
//! Applies operations to a JSON tree. Paths are navigated step by step, so
//! raw steps containing `/` or `~` address the keys they name.

use content_path::{encode_patch_path, is_child, is_valid_index, validate_path, MAX_PATH_DEPTH};
use content_schema::FileReference;
use serde_json::Value;
use tracing::debug;

use crate::file::parse_data_url;
use crate::types::{Op, OpResult, PatchError, PatchResult, StagedFile};

/// Options for [`apply_patch_with`].
#[derive(Debug, Clone)]
pub struct ApplyPatchOptions {
    /// Operations with deeper paths are rejected before anything is applied.
    pub max_path_depth: usize,
}

impl Default for ApplyPatchOptions {
    fn default() -> Self {
        Self { max_path_depth: MAX_PATH_DEPTH }
    }
}

// ── Path navigation ───────────────────────────────────────────────────────

fn array_index(step: &str, len: usize) -> Option<usize> {
    if !is_valid_index(step) {
        return None;
    }
    step.parse().ok().filter(|i| *i < len)
}

/// Immutable navigation to the value at `path`.
pub fn get_at<'a>(doc: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(doc, |node, step| match node {
        Value::Object(map) => map.get(step),
        Value::Array(arr) => array_index(step, arr.len()).map(|i| &arr[i]),
        _ => None,
    })
}

/// Mutable navigation to the value at `path` (must exist).
fn get_mut_at<'a>(doc: &'a mut Value, path: &[String]) -> Result<&'a mut Value, PatchError> {
    let mut node = doc;
    for (depth, step) in path.iter().enumerate() {
        node = match node {
            Value::Object(map) => map.get_mut(step),
            Value::Array(arr) => {
                let len = arr.len();
                array_index(step, len).and_then(move |i| arr.get_mut(i))
            }
            _ => None,
        }
        .ok_or_else(|| PatchError::not_found(&path[..=depth]))?;
    }
    Ok(node)
}

fn split_last(path: &[String]) -> Option<(&[String], &String)> {
    let (key, parent) = path.split_last()?;
    Some((parent, key))
}

// ── Individual operation applicators ─────────────────────────────────────

fn apply_add(doc: &mut Value, path: &[String], value: Value) -> Result<Option<Value>, PatchError> {
    let Some((parent_path, key)) = split_last(path) else {
        return Ok(Some(std::mem::replace(doc, value)));
    };
    let parent = get_mut_at(doc, parent_path)?;
    match parent {
        Value::Object(map) => Ok(map.insert(key.clone(), value)),
        Value::Array(arr) => {
            if key == "-" {
                arr.push(value);
                return Ok(None);
            }
            let idx = array_index(key, arr.len() + 1).ok_or_else(|| PatchError::invalid_index(path))?;
            arr.insert(idx, value);
            Ok(None)
        }
        _ => Err(PatchError::invalid_target(path)),
    }
}

fn apply_remove(doc: &mut Value, path: &[String]) -> Result<Value, PatchError> {
    let (parent_path, key) = split_last(path).ok_or_else(|| PatchError::invalid_target(path))?;
    let parent = get_mut_at(doc, parent_path)?;
    match parent {
        Value::Object(map) => map.shift_remove(key).ok_or_else(|| PatchError::not_found(path)),
        Value::Array(arr) => {
            if !is_valid_index(key) {
                return Err(PatchError::invalid_index(path));
            }
            let idx = array_index(key, arr.len()).ok_or_else(|| PatchError::not_found(path))?;
            Ok(arr.remove(idx))
        }
        _ => Err(PatchError::invalid_target(path)),
    }
}

fn apply_replace(doc: &mut Value, path: &[String], value: Value) -> Result<Value, PatchError> {
    let target = get_mut_at(doc, path)?;
    Ok(std::mem::replace(target, value))
}

fn apply_copy(doc: &mut Value, path: &[String], from: &[String]) -> Result<Option<Value>, PatchError> {
    let src = get_at(doc, from).ok_or_else(|| PatchError::not_found(from))?.clone();
    apply_add(doc, path, src)
}

fn apply_move(doc: &mut Value, path: &[String], from: &[String]) -> Result<Option<Value>, PatchError> {
    if path == from {
        return Err(PatchError::MoveOntoItself(encode_patch_path(path)));
    }
    if is_child(from, path) {
        return Err(PatchError::invalid_target(path));
    }
    let value = apply_remove(doc, from)?;
    apply_add(doc, path, value)
}

fn apply_test(doc: &Value, path: &[String], value: &Value) -> Result<(), PatchError> {
    let actual = get_at(doc, path).ok_or_else(|| PatchError::not_found(path))?;
    if actual != value {
        return Err(PatchError::Test(encode_patch_path(path)));
    }
    Ok(())
}

fn apply_file(
    doc: &mut Value,
    path: &[String],
    value: &str,
    nested_path: Option<&[String]>,
) -> Result<StagedFile, PatchError> {
    let reference = get_at(doc, path)
        .and_then(FileReference::from_value)
        .ok_or_else(|| PatchError::FileReferenceMissing(encode_patch_path(path)))?;
    let payload = parse_data_url(value)
        .map_err(|reason| PatchError::InvalidFilePayload(format!("{}: {reason}", encode_patch_path(path))))?;
    if let Some(nested) = nested_path {
        apply_add(doc, nested, Value::String(reference.reference.clone()))?;
    }
    Ok(StagedFile {
        reference: reference.reference,
        nested_path: nested_path.map(<[String]>::to_vec),
        mime_type: payload.mime_type,
        bytes: payload.bytes,
    })
}

// ── Main apply function ───────────────────────────────────────────────────

/// Apply a single operation to the document (in-place mutation).
pub fn apply_op(doc: &mut Value, op: &Op) -> Result<OpResult, PatchError> {
    let result = match op {
        Op::Add { path, value } => OpResult { old: apply_add(doc, path, value.clone())?, staged: None },
        Op::Remove { path } => OpResult { old: Some(apply_remove(doc, path)?), staged: None },
        Op::Replace { path, value } => {
            OpResult { old: Some(apply_replace(doc, path, value.clone())?), staged: None }
        }
        Op::Copy { from, path } => OpResult { old: apply_copy(doc, path, from)?, staged: None },
        Op::Move { from, path } => OpResult { old: apply_move(doc, path, from)?, staged: None },
        Op::Test { path, value } => {
            apply_test(doc, path, value)?;
            OpResult::default()
        }
        Op::File { path, value, nested_path } => OpResult {
            old: None,
            staged: Some(apply_file(doc, path, value, nested_path.as_deref())?),
        },
    };
    Ok(result)
}

/// Apply a sequence of operations to an owned document. Stops at the first
/// failing operation.
pub fn apply_ops(mut doc: Value, ops: &[Op]) -> Result<PatchResult, PatchError> {
    let mut results = Vec::with_capacity(ops.len());
    for op in ops {
        results.push(apply_op(&mut doc, op)?);
    }
    Ok(PatchResult { doc, res: results })
}

/// Apply a patch to a borrowed document, leaving the input untouched.
pub fn apply_patch(doc: &Value, ops: &[Op]) -> Result<PatchResult, PatchError> {
    apply_patch_with(doc, ops, &ApplyPatchOptions::default())
}

pub fn apply_patch_with(
    doc: &Value,
    ops: &[Op],
    options: &ApplyPatchOptions,
) -> Result<PatchResult, PatchError> {
    for op in ops {
        let nested = match op {
            Op::File { nested_path, .. } => nested_path.as_ref(),
            _ => None,
        };
        let paths = std::iter::once(op.path()).chain(op.from()).chain(nested);
        for path in paths {
            validate_path(path, options.max_path_depth)
                .map_err(|e| PatchError::InvalidOp(e.to_string()))?;
        }
    }
    let result = apply_ops(doc.clone(), ops);
    match &result {
        Ok(r) => debug!(target: "content_patch::apply", ops = ops.len(), staged = r.staged_files().count(), "patch applied"),
        Err(e) => debug!(target: "content_patch::apply", error = %e, "patch rejected"),
    }
    result
}

// ── Tests ─────────────────────────────────────────────────────────────────
