use content_patch::{
    apply_patch, from_json_patch, generate_patch, merge_module, to_json_patch, MergeOptions, Op,
    PendingPatch,
};
use serde_json::Value;

use super::fixtures::FixtureRecord;

fn field<'a>(record: &'a FixtureRecord, key: &str) -> Result<&'a Value, String> {
    record.fixture.get(key).ok_or_else(|| format!("fixture is missing `{key}`"))
}

fn decode(patch: &Value) -> Result<Vec<Op>, String> {
    from_json_patch(patch).map_err(|e| format!("decode failed: {e}"))
}

/// Run one fixture; `Err` carries a description of the mismatch.
pub fn evaluate_fixture(record: &FixtureRecord) -> Result<(), String> {
    match record.entry.scenario.as_str() {
        "apply" => eval_apply(record),
        "apply_error" => eval_apply_error(record),
        "diff" => eval_diff(record),
        "merge" => eval_merge(record),
        other => Err(format!("unknown scenario {other}")),
    }
}

fn eval_apply(record: &FixtureRecord) -> Result<(), String> {
    let doc = field(record, "doc")?;
    let ops = decode(field(record, "patch")?)?;
    let result = apply_patch(doc, &ops).map_err(|e| format!("apply failed: {e}"))?;
    let expected = field(record, "expected")?;
    if &result.doc != expected {
        return Err(format!("doc mismatch: got {}, want {expected}", result.doc));
    }
    if let Some(Value::Array(staged)) = record.fixture.get("staged") {
        let got: Vec<_> = result.staged_files().collect();
        if got.len() != staged.len() {
            return Err(format!("staged {} files, want {}", got.len(), staged.len()));
        }
        for (file, want) in got.iter().zip(staged) {
            let bytes = want["bytes"].as_str().unwrap_or_default().as_bytes();
            if file.reference != want["reference"] || file.mime_type != want["mime_type"] || file.bytes != bytes {
                return Err(format!("staged file mismatch: {file:?} vs {want}"));
            }
        }
    }
    Ok(())
}

fn eval_apply_error(record: &FixtureRecord) -> Result<(), String> {
    let doc = field(record, "doc")?;
    let ops = decode(field(record, "patch")?)?;
    let want = field(record, "error")?.as_str().ok_or("`error` must be a string")?;
    match apply_patch(doc, &ops) {
        Ok(result) => Err(format!("expected {want}, patch applied: {}", result.doc)),
        Err(err) if err.to_string() == want => Ok(()),
        Err(err) => Err(format!("expected {want}, got {err}")),
    }
}

fn eval_diff(record: &FixtureRecord) -> Result<(), String> {
    let before = field(record, "before")?;
    let after = field(record, "after")?;
    let ops = generate_patch(before, after, &[]);
    let names: Vec<Value> = ops.iter().map(|op| Value::from(op.op_name())).collect();
    if let Some(Value::Array(want)) = record.fixture.get("ops") {
        if &names != want {
            return Err(format!("op names {names:?}, want {want:?}"));
        }
    }
    let patched = apply_patch(before, &ops).map_err(|e| format!("generated patch failed: {e}"))?;
    if &patched.doc != after {
        return Err(format!("round trip mismatch: {}", patched.doc));
    }
    Ok(())
}

fn eval_merge(record: &FixtureRecord) -> Result<(), String> {
    let Value::Array(pending) = field(record, "pending")? else {
        return Err("`pending` must be an array".into());
    };
    let queue = pending
        .iter()
        .enumerate()
        .map(|(seq, patch)| -> Result<PendingPatch, String> {
            Ok(PendingPatch::new(decode(patch)?, seq as u64))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let merged: Vec<Value> = merge_module(&queue, &MergeOptions::default())
        .iter()
        .map(|patch| to_json_patch(patch))
        .collect();
    let Value::Array(expected) = field(record, "expected")? else {
        return Err("`expected` must be an array".into());
    };
    if &merged != expected {
        return Err(format!("merged {merged:?}, want {expected:?}"));
    }
    Ok(())
}
