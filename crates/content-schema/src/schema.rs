//! The serialized schema model.
//!
//! Schemas travel as JSON tagged by a `"type"` field, for example
//! `{"type": "object", "items": {"title": {"type": "string"}}, "opt": false}`.
//! Every variant carries `opt`: an optional value may be `null` or absent.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Module id → schema lookup table, injected wherever module ids must be
/// recognized (see `content_path::ModuleRegistry`).
pub type SchemaCatalog = IndexMap<String, SerializedSchema>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SerializedSchema {
    String(StringSchema),
    Number(NumberSchema),
    Boolean(BooleanSchema),
    Literal(LiteralSchema),
    Object(ObjectSchema),
    Array(ArraySchema),
    Record(RecordSchema),
    Union(UnionSchema),
    RichText(RichTextSchema),
    Image(ImageSchema),
    File(FileSchema),
    I18n(I18nSchema),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringSchema {
    #[serde(default)]
    pub opt: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regexp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberSchema {
    #[serde(default)]
    pub opt: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BooleanSchema {
    #[serde(default)]
    pub opt: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralSchema {
    pub value: String,
    #[serde(default)]
    pub opt: bool,
}

/// Named, ordered properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectSchema {
    pub items: IndexMap<String, SerializedSchema>,
    #[serde(default)]
    pub opt: bool,
}

/// A list whose elements share one schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArraySchema {
    pub item: Box<SerializedSchema>,
    #[serde(default)]
    pub opt: bool,
}

/// A string-keyed map whose values share one schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSchema {
    pub item: Box<SerializedSchema>,
    #[serde(default)]
    pub opt: bool,
}

/// A union of object members told apart by the literal at `key`, or, when
/// `key` is absent, a union of string literals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub items: Vec<SerializedSchema>,
    #[serde(default)]
    pub opt: bool,
}

impl UnionSchema {
    /// The object member whose discriminant literal equals `discriminant`.
    pub fn member(&self, discriminant: &str) -> Option<&SerializedSchema> {
        let key = self.key.as_deref()?;
        self.items.iter().find(|item| match item {
            SerializedSchema::Object(obj) => matches!(
                obj.items.get(key),
                Some(SerializedSchema::Literal(lit)) if lit.value == discriminant
            ),
            _ => false,
        })
    }

    /// True if `value` is one of the literal members.
    pub fn has_literal(&self, value: &str) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, SerializedSchema::Literal(lit) if lit.value == value))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichTextSchema {
    #[serde(default)]
    pub opt: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSchema {
    #[serde(default)]
    pub opt: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileSchema {
    #[serde(default)]
    pub opt: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
}

/// One value per locale, all sharing `item`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct I18nSchema {
    pub locales: Vec<String>,
    pub item: Box<SerializedSchema>,
    #[serde(default)]
    pub opt: bool,
}

impl SerializedSchema {
    pub fn string() -> Self {
        SerializedSchema::String(StringSchema::default())
    }

    pub fn number() -> Self {
        SerializedSchema::Number(NumberSchema::default())
    }

    pub fn boolean() -> Self {
        SerializedSchema::Boolean(BooleanSchema::default())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        SerializedSchema::Literal(LiteralSchema { value: value.into(), opt: false })
    }

    pub fn object<I, K>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, SerializedSchema)>,
        K: Into<String>,
    {
        SerializedSchema::Object(ObjectSchema {
            items: items.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            opt: false,
        })
    }

    pub fn array(item: SerializedSchema) -> Self {
        SerializedSchema::Array(ArraySchema { item: Box::new(item), opt: false })
    }

    pub fn record(item: SerializedSchema) -> Self {
        SerializedSchema::Record(RecordSchema { item: Box::new(item), opt: false })
    }

    pub fn union(key: impl Into<String>, items: Vec<SerializedSchema>) -> Self {
        SerializedSchema::Union(UnionSchema { key: Some(key.into()), items, opt: false })
    }

    pub fn literal_union<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SerializedSchema::Union(UnionSchema {
            key: None,
            items: values.into_iter().map(SerializedSchema::literal).collect(),
            opt: false,
        })
    }

    pub fn richtext() -> Self {
        SerializedSchema::RichText(RichTextSchema::default())
    }

    pub fn image() -> Self {
        SerializedSchema::Image(ImageSchema::default())
    }

    pub fn file() -> Self {
        SerializedSchema::File(FileSchema::default())
    }

    pub fn i18n<I, S>(locales: I, item: SerializedSchema) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SerializedSchema::I18n(I18nSchema {
            locales: locales.into_iter().map(Into::into).collect(),
            item: Box::new(item),
            opt: false,
        })
    }

    /// Mark the schema optional.
    pub fn optional(mut self) -> Self {
        *self.opt_mut() = true;
        self
    }

    pub fn is_optional(&self) -> bool {
        match self {
            SerializedSchema::String(s) => s.opt,
            SerializedSchema::Number(s) => s.opt,
            SerializedSchema::Boolean(s) => s.opt,
            SerializedSchema::Literal(s) => s.opt,
            SerializedSchema::Object(s) => s.opt,
            SerializedSchema::Array(s) => s.opt,
            SerializedSchema::Record(s) => s.opt,
            SerializedSchema::Union(s) => s.opt,
            SerializedSchema::RichText(s) => s.opt,
            SerializedSchema::Image(s) => s.opt,
            SerializedSchema::File(s) => s.opt,
            SerializedSchema::I18n(s) => s.opt,
        }
    }

    fn opt_mut(&mut self) -> &mut bool {
        match self {
            SerializedSchema::String(s) => &mut s.opt,
            SerializedSchema::Number(s) => &mut s.opt,
            SerializedSchema::Boolean(s) => &mut s.opt,
            SerializedSchema::Literal(s) => &mut s.opt,
            SerializedSchema::Object(s) => &mut s.opt,
            SerializedSchema::Array(s) => &mut s.opt,
            SerializedSchema::Record(s) => &mut s.opt,
            SerializedSchema::Union(s) => &mut s.opt,
            SerializedSchema::RichText(s) => &mut s.opt,
            SerializedSchema::Image(s) => &mut s.opt,
            SerializedSchema::File(s) => &mut s.opt,
            SerializedSchema::I18n(s) => &mut s.opt,
        }
    }

    /// The `"type"` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            SerializedSchema::String(_) => "string",
            SerializedSchema::Number(_) => "number",
            SerializedSchema::Boolean(_) => "boolean",
            SerializedSchema::Literal(_) => "literal",
            SerializedSchema::Object(_) => "object",
            SerializedSchema::Array(_) => "array",
            SerializedSchema::Record(_) => "record",
            SerializedSchema::Union(_) => "union",
            SerializedSchema::RichText(_) => "richtext",
            SerializedSchema::Image(_) => "image",
            SerializedSchema::File(_) => "file",
            SerializedSchema::I18n(_) => "i18n",
        }
    }

    /// Leaves cannot be descended into by a module path. Rich text has its
    /// own internal addressing and counts as a leaf here.
    pub fn is_leaf(&self) -> bool {
        match self {
            SerializedSchema::String(_)
            | SerializedSchema::Number(_)
            | SerializedSchema::Boolean(_)
            | SerializedSchema::Literal(_)
            | SerializedSchema::RichText(_)
            | SerializedSchema::Image(_)
            | SerializedSchema::File(_) => true,
            SerializedSchema::Union(u) => u.key.is_none(),
            SerializedSchema::Object(_)
            | SerializedSchema::Array(_)
            | SerializedSchema::Record(_)
            | SerializedSchema::I18n(_) => false,
        }
    }
}
