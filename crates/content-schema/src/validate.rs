//! Structural validation of a module source against its schema.

use std::collections::HashMap;
use std::fmt;

use content_path::{encode_module_path, Segment};
use regex::Regex;
use serde_json::Value;

use crate::file_ref::FileReference;
use crate::resolve::json_type;
use crate::richtext::RichText;
use crate::schema::SerializedSchema;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIssue {
    /// Module path of the offending value.
    pub path: String,
    pub message: String,
}

impl fmt::Display for SourceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Every disagreement between `source` and `schema`. An empty result means
/// the source is valid.
pub fn validate_source(schema: &SerializedSchema, source: &Value) -> Vec<SourceIssue> {
    let mut validator = Validator::default();
    validator.check(schema, source);
    validator.issues
}

#[derive(Default)]
struct Validator {
    path: Vec<Segment>,
    issues: Vec<SourceIssue>,
    /// Compiled string patterns; `None` for patterns that fail to compile.
    patterns: HashMap<String, Option<Regex>>,
}

impl Validator {
    fn pattern_matches(&mut self, pattern: &str, text: &str) -> Option<bool> {
        self.patterns
            .entry(pattern.to_string())
            .or_insert_with(|| Regex::new(pattern).ok())
            .as_ref()
            .map(|re| re.is_match(text))
    }

    fn report(&mut self, message: impl Into<String>) {
        self.issues.push(SourceIssue { path: encode_module_path(&self.path), message: message.into() });
    }

    fn expected(&mut self, expected: &str, found: &Value) {
        self.report(format!("expected {expected}, found {}", json_type(found)));
    }

    fn descend(&mut self, segment: Segment, schema: &SerializedSchema, source: &Value) {
        self.path.push(segment);
        self.check(schema, source);
        self.path.pop();
    }

    fn check(&mut self, schema: &SerializedSchema, source: &Value) {
        if source.is_null() {
            if !schema.is_optional() {
                self.report("value is required");
            }
            return;
        }
        match schema {
            SerializedSchema::String(s) => {
                let Some(text) = source.as_str() else { return self.expected("string", source) };
                let len = text.chars().count();
                if let Some(min) = s.min_length.filter(|min| len < *min) {
                    self.report(format!("shorter than {min} characters"));
                }
                if let Some(max) = s.max_length.filter(|max| len > *max) {
                    self.report(format!("longer than {max} characters"));
                }
                if let Some(pattern) = &s.regexp {
                    match self.pattern_matches(pattern, text) {
                        Some(false) => self.report(format!("does not match /{pattern}/")),
                        Some(true) => {}
                        None => self.report(format!("invalid pattern /{pattern}/ in schema")),
                    }
                }
            }
            SerializedSchema::Number(n) => {
                let Some(num) = source.as_f64() else { return self.expected("number", source) };
                if let Some(min) = n.min.filter(|min| num < *min) {
                    self.report(format!("less than {min}"));
                }
                if let Some(max) = n.max.filter(|max| num > *max) {
                    self.report(format!("greater than {max}"));
                }
            }
            SerializedSchema::Boolean(_) => {
                if !source.is_boolean() {
                    self.expected("boolean", source);
                }
            }
            SerializedSchema::Literal(lit) => {
                if source.as_str() != Some(lit.value.as_str()) {
                    self.report(format!("expected literal {:?}", lit.value));
                }
            }
            SerializedSchema::Object(obj) => {
                let Some(map) = source.as_object() else { return self.expected("object", source) };
                for (key, item) in &obj.items {
                    match map.get(key) {
                        Some(value) => self.descend(Segment::Key(key.clone()), item, value),
                        None if item.is_optional() => {}
                        None => {
                            self.path.push(Segment::Key(key.clone()));
                            self.report("value is required");
                            self.path.pop();
                        }
                    }
                }
                for key in map.keys().filter(|k| !obj.items.contains_key(*k)) {
                    self.report(format!("unexpected key {key:?}"));
                }
            }
            SerializedSchema::Array(arr) => {
                let Some(items) = source.as_array() else { return self.expected("array", source) };
                for (i, value) in items.iter().enumerate() {
                    self.descend(Segment::Index(i), &arr.item, value);
                }
            }
            SerializedSchema::Record(rec) => {
                let Some(map) = source.as_object() else { return self.expected("object", source) };
                for (key, value) in map {
                    self.descend(Segment::Key(key.clone()), &rec.item, value);
                }
            }
            SerializedSchema::Union(union) => match union.key.as_deref() {
                Some(key) => {
                    let discriminant = source.get(key).and_then(Value::as_str);
                    match discriminant.and_then(|d| union.member(d)) {
                        Some(member) => self.check(member, source),
                        None => self.report(format!(
                            "discriminant {key:?} matches no union member (found {discriminant:?})"
                        )),
                    }
                }
                None => match source.as_str() {
                    Some(value) if union.has_literal(value) => {}
                    _ => self.report("value is not one of the union literals"),
                },
            },
            SerializedSchema::RichText(_) => {
                if let Err(err) = RichText::from_source(source) {
                    self.report(err.to_string());
                }
            }
            SerializedSchema::Image(_) | SerializedSchema::File(_) => {
                if FileReference::from_value(source).is_none() {
                    self.report("expected a file reference");
                }
            }
            SerializedSchema::I18n(i18n) => {
                let Some(map) = source.as_object() else { return self.expected("object", source) };
                for locale in &i18n.locales {
                    match map.get(locale) {
                        Some(value) => self.descend(Segment::Key(locale.clone()), &i18n.item, value),
                        None => {
                            self.path.push(Segment::Key(locale.clone()));
                            self.report("missing locale");
                            self.path.pop();
                        }
                    }
                }
                for key in map.keys().filter(|k| !i18n.locales.contains(*k)) {
                    self.report(format!("unknown locale {key:?}"));
                }
            }
        }
    }
}
