//! Schema-guided resolution of module paths.
//!
//! The resolver consumes one segment at a time, stepping through the source
//! value and its schema together. Every failure names the module path that
//! had been consumed when it happened.

use content_path::{decode_module_path, encode_module_path, is_valid_index, PathError, Segment};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::schema::{SerializedSchema, UnionSchema};

static NULL: Value = Value::Null;

/// The value and schema found at a module path. `source` is `null` when the
/// path names an optional value that is absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedValue<'a> {
    pub source: &'a Value,
    pub schema: &'a SerializedSchema,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolutionError {
    #[error(transparent)]
    MalformedPath(#[from] PathError),
    #[error("cannot descend into {schema_type} at path {path:?}")]
    CannotDescendIntoLeaf { path: String, schema_type: &'static str },
    #[error("index {index} out of range (length {len}) at path {path:?}")]
    IndexOutOfRange { path: String, index: usize, len: usize },
    #[error("optional value is null at path {path:?}")]
    OptionalNullTraversal { path: String },
    #[error("union discriminant {key:?} ({found:?}) matches no member at path {path:?}")]
    UnionDiscriminantMismatch { path: String, key: String, found: Option<String> },
    #[error("schema has no key {key:?} at path {path:?}")]
    UnknownKey { path: String, key: String },
    #[error("{segment} is not an array index at path {path:?}")]
    InvalidIndex { path: String, segment: String },
    #[error("unknown locale {locale:?} at path {path:?}")]
    UnknownLocale { path: String, locale: String },
    #[error("expected {expected}, found {found} at path {path:?}")]
    TypeMismatch { path: String, expected: &'static str, found: &'static str },
    #[error("no source at path {path:?}")]
    MissingSource { path: String },
}

impl ResolutionError {
    /// Source and schema disagree in shape (everything but a bad path).
    pub fn is_schema_mismatch(&self) -> bool {
        !matches!(self, ResolutionError::MalformedPath(_))
    }

    /// The module path consumed when resolution stopped.
    pub fn path(&self) -> Option<&str> {
        match self {
            ResolutionError::MalformedPath(_) => None,
            ResolutionError::CannotDescendIntoLeaf { path, .. }
            | ResolutionError::IndexOutOfRange { path, .. }
            | ResolutionError::OptionalNullTraversal { path }
            | ResolutionError::UnionDiscriminantMismatch { path, .. }
            | ResolutionError::UnknownKey { path, .. }
            | ResolutionError::InvalidIndex { path, .. }
            | ResolutionError::UnknownLocale { path, .. }
            | ResolutionError::TypeMismatch { path, .. }
            | ResolutionError::MissingSource { path } => Some(path),
        }
    }
}

/// Resolve `module_path` against a module's source and schema.
pub fn resolve_path<'a>(
    module_path: &str,
    source: &'a Value,
    schema: &'a SerializedSchema,
) -> Result<ResolvedValue<'a>, ResolutionError> {
    let segments = decode_module_path(module_path)?;
    resolve_segments(&segments, source, schema)
}

/// Resolve already decoded segments.
pub fn resolve_segments<'a>(
    segments: &[Segment],
    source: &'a Value,
    schema: &'a SerializedSchema,
) -> Result<ResolvedValue<'a>, ResolutionError> {
    let mut current = ResolvedValue { source, schema };
    for (i, segment) in segments.iter().enumerate() {
        current = step(current, segment, &segments[..i])?;
    }
    Ok(current)
}

/// Resolve an i18n value once per locale.
///
/// `module_path` must lead to an i18n schema; the result maps each locale of
/// that schema to its resolved value.
pub fn resolve_all_locales<'a>(
    module_path: &str,
    source: &'a Value,
    schema: &'a SerializedSchema,
) -> Result<IndexMap<String, ResolvedValue<'a>>, ResolutionError> {
    let mut segments = decode_module_path(module_path)?;
    let resolved = resolve_segments(&segments, source, schema)?;
    let SerializedSchema::I18n(i18n) = resolved.schema else {
        return Err(ResolutionError::TypeMismatch {
            path: module_path.to_string(),
            expected: "i18n",
            found: resolved.schema.type_name(),
        });
    };
    let mut out = IndexMap::with_capacity(i18n.locales.len());
    for locale in &i18n.locales {
        segments.push(Segment::Key(locale.clone()));
        let value = resolve_segments(&segments, source, schema)?;
        segments.pop();
        out.insert(locale.clone(), value);
    }
    Ok(out)
}

fn step<'a>(
    current: ResolvedValue<'a>,
    segment: &Segment,
    at: &[Segment],
) -> Result<ResolvedValue<'a>, ResolutionError> {
    let ResolvedValue { source, schema } = current;
    if source.is_null() && schema.is_optional() {
        return Err(ResolutionError::OptionalNullTraversal { path: encode_module_path(at) });
    }
    match schema {
        SerializedSchema::Object(obj) => {
            let key = key_of(segment);
            let sub_schema = obj.items.get(key.as_str()).ok_or_else(|| ResolutionError::UnknownKey {
                path: encode_module_path(at),
                key: key.clone(),
            })?;
            let map = expect_object(source, at)?;
            let sub_source = member_or_null(map.get(key.as_str()), sub_schema, at, segment)?;
            Ok(ResolvedValue { source: sub_source, schema: sub_schema })
        }
        SerializedSchema::Array(arr) => {
            let index = index_of(segment, at)?;
            let items = source.as_array().ok_or_else(|| mismatch(at, "array", source))?;
            let sub_source = items.get(index).ok_or_else(|| ResolutionError::IndexOutOfRange {
                path: encode_module_path(at),
                index,
                len: items.len(),
            })?;
            Ok(ResolvedValue { source: sub_source, schema: &arr.item })
        }
        SerializedSchema::Record(rec) => {
            let key = key_of(segment);
            let map = expect_object(source, at)?;
            let sub_source = map.get(key.as_str()).ok_or_else(|| missing(at, segment))?;
            Ok(ResolvedValue { source: sub_source, schema: &rec.item })
        }
        SerializedSchema::I18n(i18n) => {
            let locale = key_of(segment);
            if !i18n.locales.iter().any(|l| *l == locale) {
                return Err(ResolutionError::UnknownLocale { path: encode_module_path(at), locale });
            }
            let map = expect_object(source, at)?;
            let sub_source = member_or_null(map.get(locale.as_str()), &i18n.item, at, segment)?;
            Ok(ResolvedValue { source: sub_source, schema: &i18n.item })
        }
        SerializedSchema::Union(union) if union.key.is_some() => {
            let member = union_member(union, source, at)?;
            step(ResolvedValue { source, schema: member }, segment, at)
        }
        leaf => Err(ResolutionError::CannotDescendIntoLeaf {
            path: encode_module_path(at),
            schema_type: leaf.type_name(),
        }),
    }
}

fn union_member<'a>(
    union: &'a UnionSchema,
    source: &Value,
    at: &[Segment],
) -> Result<&'a SerializedSchema, ResolutionError> {
    let key = union.key.clone().unwrap_or_default();
    let map = expect_object(source, at)?;
    let found = map.get(key.as_str()).and_then(Value::as_str);
    match found.and_then(|d| union.member(d)) {
        Some(member) => Ok(member),
        None => Err(ResolutionError::UnionDiscriminantMismatch {
            path: encode_module_path(at),
            key,
            found: found.map(str::to_string),
        }),
    }
}

/// Object-like schemas take every segment as a key; an unquoted integer
/// segment names a numeric key here.
fn key_of(segment: &Segment) -> String {
    match segment {
        Segment::Key(k) => k.clone(),
        Segment::Index(i) => i.to_string(),
    }
}

fn index_of(segment: &Segment, at: &[Segment]) -> Result<usize, ResolutionError> {
    match segment {
        Segment::Index(i) => Ok(*i),
        Segment::Key(k) if is_valid_index(k) => k.parse().map_err(|_| ResolutionError::InvalidIndex {
            path: encode_module_path(at),
            segment: segment.encode(),
        }),
        Segment::Key(_) => Err(ResolutionError::InvalidIndex {
            path: encode_module_path(at),
            segment: segment.encode(),
        }),
    }
}

fn expect_object<'a>(
    source: &'a Value,
    at: &[Segment],
) -> Result<&'a serde_json::Map<String, Value>, ResolutionError> {
    source.as_object().ok_or_else(|| mismatch(at, "object", source))
}

fn member_or_null<'a>(
    found: Option<&'a Value>,
    schema: &SerializedSchema,
    at: &[Segment],
    segment: &Segment,
) -> Result<&'a Value, ResolutionError> {
    match found {
        Some(value) => Ok(value),
        None if schema.is_optional() => Ok(&NULL),
        None => Err(missing(at, segment)),
    }
}

fn missing(at: &[Segment], segment: &Segment) -> ResolutionError {
    let mut path = at.to_vec();
    path.push(segment.clone());
    ResolutionError::MissingSource { path: encode_module_path(&path) }
}

fn mismatch(at: &[Segment], expected: &'static str, found: &Value) -> ResolutionError {
    ResolutionError::TypeMismatch { path: encode_module_path(at), expected, found: json_type(found) }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
