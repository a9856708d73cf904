//! Lockstep traversal of a source value and its schema.

use content_path::{encode_module_path, Segment};
use serde_json::Value;

use crate::file_ref::FileReference;
use crate::richtext::RichText;
use crate::schema::SerializedSchema;

/// Where a file reference was found.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRefLocation {
    /// Module path of the value holding the reference.
    pub module_path: String,
    /// Steps inside a rich text value; empty for image and file fields.
    pub inner_path: Vec<String>,
    pub reference: FileReference,
}

/// Visit every value the schema describes, parents before children.
///
/// Absent keys are not visited; `null` values are visited but not descended
/// into. Values whose shape disagrees with the schema are not descended into.
pub fn walk<F>(source: &Value, schema: &SerializedSchema, mut visit: F)
where
    F: FnMut(&[Segment], &Value, &SerializedSchema),
{
    let mut path = Vec::new();
    walk_inner(&mut path, source, schema, &mut visit, true);
}

fn walk_inner<F>(
    path: &mut Vec<Segment>,
    source: &Value,
    schema: &SerializedSchema,
    visit: &mut F,
    visit_self: bool,
) where
    F: FnMut(&[Segment], &Value, &SerializedSchema),
{
    if visit_self {
        visit(path, source, schema);
    }
    if source.is_null() {
        return;
    }
    match schema {
        SerializedSchema::Object(obj) => {
            let Some(map) = source.as_object() else { return };
            for (key, item) in &obj.items {
                if let Some(value) = map.get(key) {
                    path.push(Segment::Key(key.clone()));
                    walk_inner(path, value, item, visit, true);
                    path.pop();
                }
            }
        }
        SerializedSchema::Array(arr) => {
            let Some(items) = source.as_array() else { return };
            for (i, value) in items.iter().enumerate() {
                path.push(Segment::Index(i));
                walk_inner(path, value, &arr.item, visit, true);
                path.pop();
            }
        }
        SerializedSchema::Record(rec) => {
            let Some(map) = source.as_object() else { return };
            for (key, value) in map {
                path.push(Segment::Key(key.clone()));
                walk_inner(path, value, &rec.item, visit, true);
                path.pop();
            }
        }
        SerializedSchema::I18n(i18n) => {
            let Some(map) = source.as_object() else { return };
            for locale in &i18n.locales {
                if let Some(value) = map.get(locale) {
                    path.push(Segment::Key(locale.clone()));
                    walk_inner(path, value, &i18n.item, visit, true);
                    path.pop();
                }
            }
        }
        SerializedSchema::Union(union) => {
            let Some(key) = union.key.as_deref() else { return };
            let member = source
                .get(key)
                .and_then(Value::as_str)
                .and_then(|d| union.member(d));
            if let Some(member) = member {
                // The member describes the same value.
                walk_inner(path, source, member, visit, false);
            }
        }
        _ => {}
    }
}

/// Every image, file and rich text inline image reference in `source`.
pub fn collect_file_refs(source: &Value, schema: &SerializedSchema) -> Vec<FileRefLocation> {
    let mut out = Vec::new();
    walk(source, schema, |path, value, schema| match schema {
        SerializedSchema::Image(_) | SerializedSchema::File(_) => {
            if let Some(reference) = FileReference::from_value(value) {
                out.push(FileRefLocation {
                    module_path: encode_module_path(path),
                    inner_path: Vec::new(),
                    reference,
                });
            }
        }
        SerializedSchema::RichText(_) => {
            let Ok(text) = RichText::from_source(value) else { return };
            for (steps, reference) in text.images() {
                out.push(FileRefLocation {
                    module_path: encode_module_path(path),
                    inner_path: steps,
                    reference: reference.clone(),
                });
            }
        }
        _ => {}
    });
    out
}
