//! File reference records stored in module sources.
//!
//! Image and file values are stored as `{"_ref": "/public/a.png", "_type": "file"}`
//! with optional `metadata`; the referenced bytes live outside the source.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const FILE_REF_PROP: &str = "_ref";
pub const FILE_TYPE_PROP: &str = "_type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReference {
    #[serde(rename = "_ref")]
    pub reference: String,
    #[serde(rename = "_type")]
    pub kind: FileKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl FileReference {
    pub fn new(reference: impl Into<String>) -> Self {
        FileReference { reference: reference.into(), kind: FileKind::File, metadata: None }
    }

    /// Read a file reference record out of a source value.
    pub fn from_value(value: &Value) -> Option<FileReference> {
        let map = value.as_object()?;
        if map.get(FILE_TYPE_PROP).and_then(Value::as_str) != Some("file") {
            return None;
        }
        let reference = map.get(FILE_REF_PROP)?.as_str()?.to_string();
        let metadata = map.get("metadata").and_then(Value::as_object).cloned();
        Some(FileReference { reference, kind: FileKind::File, metadata })
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(FILE_REF_PROP.into(), Value::String(self.reference.clone()));
        map.insert(FILE_TYPE_PROP.into(), Value::String("file".into()));
        if let Some(metadata) = &self.metadata {
            map.insert("metadata".into(), Value::Object(metadata.clone()));
        }
        Value::Object(map)
    }
}
