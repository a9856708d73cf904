//! Serialized content schemas and schema-guided resolution.
//!
//! A module is a JSON source tree plus a [`SerializedSchema`] describing its
//! shape. [`resolve_path`] walks both in lockstep along a module path and
//! returns the value and schema found there.
//!
//! ```
//! use content_schema::{resolve_path, SerializedSchema};
//! use serde_json::json;
//!
//! let schema = SerializedSchema::array(SerializedSchema::object([
//!     ("title", SerializedSchema::string()),
//! ]));
//! let source = json!([{ "title": "Hello" }]);
//!
//! let resolved = resolve_path(r#"0."title""#, &source, &schema).unwrap();
//! assert_eq!(resolved.source, &json!("Hello"));
//! assert_eq!(resolved.schema.type_name(), "string");
//! ```

pub mod file_ref;
pub mod resolve;
pub mod richtext;
pub mod schema;
pub mod validate;
pub mod walk;

pub use file_ref::{FileKind, FileReference, FILE_REF_PROP, FILE_TYPE_PROP};
pub use resolve::{
    resolve_all_locales, resolve_path, resolve_segments, ResolutionError, ResolvedValue,
};
pub use richtext::{Block, Inline, InlineNode, ListItem, RichText, RichTextError, Style};
pub use schema::{
    ArraySchema, BooleanSchema, FileSchema, I18nSchema, ImageSchema, LiteralSchema, NumberSchema,
    ObjectSchema, RecordSchema, RichTextSchema, SchemaCatalog, SerializedSchema, StringSchema,
    UnionSchema,
};
pub use validate::{validate_source, SourceIssue};
pub use walk::{collect_file_refs, walk, FileRefLocation};
