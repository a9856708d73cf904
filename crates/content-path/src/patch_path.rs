//! Patch path codec (RFC 6902 flavored).
//!
//! Patch paths are `/`-joined raw string steps. Array indices are decimal
//! strings, so `/blogs/0/title` decodes to `["blogs", "0", "title"]`.
//!
//! By default no escaping is applied to steps, which matches the wire form
//! other components produce. A step containing `/` therefore does not
//! survive the raw round trip; [`PathEscaping::Rfc6901`] opts into `~0`/`~1`
//! escaping for consumers that need strict RFC 6901 pointers.

use crate::{decode_module_path, PathError, Segment};

/// A step in a patch path.
pub type PathStep = String;

/// A decoded patch path.
pub type Path = Vec<PathStep>;

/// How steps are escaped when a patch path is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathEscaping {
    #[default]
    Raw,
    Rfc6901,
}

/// Unescapes a step per RFC 6901: `~1` → `/`, then `~0` → `~`.
pub fn unescape_segment(step: &str) -> String {
    if !step.contains('~') {
        return step.to_string();
    }
    step.replace("~1", "/").replace("~0", "~")
}

/// Escapes a step per RFC 6901: `~` → `~0`, then `/` → `~1`.
pub fn escape_segment(step: &str) -> String {
    if !step.contains('/') && !step.contains('~') {
        return step.to_string();
    }
    step.replace('~', "~0").replace('/', "~1")
}

/// Serialize steps as `/a/b/c` without escaping. The root path is `""`.
pub fn encode_patch_path(steps: &[String]) -> String {
    encode_patch_path_with(steps, PathEscaping::Raw)
}

pub fn encode_patch_path_with(steps: &[String], escaping: PathEscaping) -> String {
    let mut out = String::new();
    for step in steps {
        out.push('/');
        match escaping {
            PathEscaping::Raw => out.push_str(step),
            PathEscaping::Rfc6901 => out.push_str(&escape_segment(step)),
        }
    }
    out
}

/// Split `/a/b/c` into its steps, dropping the empty step before the
/// leading `/`. `""` is the root and `"/"` addresses the empty key.
pub fn decode_patch_path(path: &str) -> Result<Path, PathError> {
    decode_patch_path_with(path, PathEscaping::Raw)
}

pub fn decode_patch_path_with(path: &str, escaping: PathEscaping) -> Result<Path, PathError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    let rest = path
        .strip_prefix('/')
        .ok_or_else(|| PathError::patch(path, "must start with '/'"))?;
    let steps = rest.split('/');
    Ok(match escaping {
        PathEscaping::Raw => steps.map(str::to_string).collect(),
        PathEscaping::Rfc6901 => steps.map(unescape_segment).collect(),
    })
}

/// Reinterpret a module path as patch steps, prefixed by `base_path`.
pub fn module_path_to_steps(module_path: &str, base_path: &[String]) -> Result<Path, PathError> {
    let segments = decode_module_path(module_path)?;
    let mut steps = Vec::with_capacity(base_path.len() + segments.len());
    steps.extend(base_path.iter().cloned());
    steps.extend(segments.iter().map(Segment::to_step));
    Ok(steps)
}

/// Translate a module path into a serialized patch path.
pub fn module_to_patch_path(module_path: &str, base_path: &[String]) -> Result<String, PathError> {
    Ok(encode_patch_path(&module_path_to_steps(module_path, base_path)?))
}

/// Translate patch steps back into a module path.
///
/// Steps that are valid array indices become index segments; every other
/// step becomes a key. Numeric object keys cannot be told apart from indices
/// without a schema, so callers holding one should re-encode through it.
pub fn patch_to_module_path(steps: &[String]) -> String {
    let segments: Vec<Segment> = steps
        .iter()
        .map(|step| match step.parse::<usize>() {
            Ok(i) if is_valid_index(step) => Segment::Index(i),
            _ => Segment::Key(step.clone()),
        })
        .collect();
    crate::encode_module_path(&segments)
}

/// Prepend `base_path` to `path`.
pub fn prefix_path(base_path: &[String], path: &[String]) -> Path {
    let mut out = Vec::with_capacity(base_path.len() + path.len());
    out.extend_from_slice(base_path);
    out.extend_from_slice(path);
    out
}

/// Check if `parent` is a strict prefix of `child`.
pub fn is_child(parent: &[String], child: &[String]) -> bool {
    parent.len() < child.len() && child[..parent.len()] == *parent
}

/// Check if two paths are equal.
pub fn is_path_equal(p1: &[String], p2: &[String]) -> bool {
    p1 == p2
}

/// Check if a string is a canonical non-negative integer index (no sign, no
/// leading zeros).
pub fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|b| b.is_ascii_digit())
}
