//! Module path codec.
//!
//! A module path is a `.`-joined list of individually JSON-encoded segments:
//! `"blogs".0."title"`. Keys are always quoted, indices never are, so a key
//! that contains `.` or `"` or consists only of digits survives a round trip.

use serde_json::Value;

use crate::{PathError, Segment};

/// Encode segments into a module path. The empty list encodes to `""`.
pub fn encode_module_path(segments: &[Segment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(&segment.encode());
    }
    out
}

/// Decode a module path into its segments.
///
/// The tokenizer is quote-aware, so a `.` inside a quoted key does not split
/// it. Unquoted segments must be non-negative integers.
pub fn decode_module_path(path: &str) -> Result<Vec<Segment>, PathError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    let bytes = path.as_bytes();
    let mut segments = Vec::new();
    let mut pos = 0;
    loop {
        let end = if bytes[pos] == b'"' {
            scan_quoted(path, pos)?
        } else {
            path[pos..].find('.').map_or(path.len(), |i| pos + i)
        };
        segments.push(parse_segment(path, &path[pos..end])?);
        if end == path.len() {
            break;
        }
        if bytes[end] != b'.' {
            return Err(PathError::module(path, "expected '.' after quoted segment"));
        }
        pos = end + 1;
        if pos == path.len() {
            return Err(PathError::module(path, "trailing '.'"));
        }
    }
    Ok(segments)
}

/// The module path of the parent value, or `None` at the module root.
pub fn parent_module_path(path: &str) -> Result<Option<String>, PathError> {
    let mut segments = decode_module_path(path)?;
    if segments.pop().is_none() {
        return Ok(None);
    }
    Ok(Some(encode_module_path(&segments)))
}

/// Returns the byte offset just past the closing quote of the string segment
/// starting at `start`.
fn scan_quoted(path: &str, start: usize) -> Result<usize, PathError> {
    let bytes = path.as_bytes();
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(PathError::module(path, "unterminated string segment"))
}

fn parse_segment(path: &str, raw: &str) -> Result<Segment, PathError> {
    if raw.is_empty() {
        return Err(PathError::module(path, "empty segment"));
    }
    if raw.starts_with('"') {
        return match serde_json::from_str::<Value>(raw) {
            Ok(Value::String(key)) => Ok(Segment::Key(key)),
            _ => Err(PathError::module(path, "invalid JSON string segment")),
        };
    }
    if !crate::is_valid_index(raw) {
        return Err(PathError::module(path, "segment is neither a JSON string nor an index"));
    }
    raw.parse::<usize>()
        .map(Segment::Index)
        .map_err(|_| PathError::module(path, "index out of range"))
}
