use content_path::{decode_module_path, Segment};
use content_schema::{
    resolve_all_locales, resolve_path, resolve_segments, ResolutionError, SerializedSchema,
};
use serde_json::{json, Value};

fn blog_schema() -> SerializedSchema {
    SerializedSchema::array(SerializedSchema::object([
        ("title", SerializedSchema::i18n(["en", "nb"], SerializedSchema::string())),
        ("tags", SerializedSchema::record(SerializedSchema::number())),
        (
            "content",
            SerializedSchema::union(
                "type",
                vec![
                    SerializedSchema::object([
                        ("type", SerializedSchema::literal("text")),
                        ("text", SerializedSchema::richtext()),
                    ]),
                    SerializedSchema::object([
                        ("type", SerializedSchema::literal("image")),
                        ("image", SerializedSchema::image()),
                        ("alt", SerializedSchema::string().optional()),
                    ]),
                ],
            ),
        ),
    ]))
}

fn blog_source() -> Value {
    json!([
        {
            "title": { "en": "Hello", "nb": "Hei" },
            "tags": { "rust": 1, "a.b": 2 },
            "content": { "type": "image", "image": { "_ref": "/public/a.png", "_type": "file" } }
        }
    ])
}

#[test]
fn resolution_is_deterministic() {
    let schema = blog_schema();
    let source = blog_source();
    let first = resolve_path(r#"0."title"."nb""#, &source, &schema).unwrap();
    let second = resolve_path(r#"0."title"."nb""#, &source, &schema).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.source, &json!("Hei"));
}

#[test]
fn missing_object_key_is_schema_mismatch() {
    let schema = blog_schema();
    let source = blog_source();
    let err = resolve_path(r#"0."missing""#, &source, &schema).unwrap_err();
    assert!(err.is_schema_mismatch());
    assert_eq!(err, ResolutionError::UnknownKey { path: "0".into(), key: "missing".into() });
    assert_eq!(err.path(), Some("0"));
}

#[test]
fn malformed_path_is_not_a_mismatch() {
    let schema = blog_schema();
    let source = blog_source();
    let err = resolve_path(r#"0."title"#, &source, &schema).unwrap_err();
    assert!(matches!(err, ResolutionError::MalformedPath(_)));
    assert!(!err.is_schema_mismatch());
}

#[test]
fn record_keys_with_dots() {
    let schema = blog_schema();
    let source = blog_source();
    let resolved = resolve_path(r#"0."tags"."a.b""#, &source, &schema).unwrap();
    assert_eq!(resolved.source, &json!(2));
    assert_eq!(resolved.schema, &SerializedSchema::number());
}

#[test]
fn union_member_selected_by_discriminant() {
    let schema = blog_schema();
    let source = blog_source();
    let resolved = resolve_path(r#"0."content"."image""#, &source, &schema).unwrap();
    assert_eq!(resolved.schema.type_name(), "image");

    let absent = resolve_path(r#"0."content"."alt""#, &source, &schema).unwrap();
    assert_eq!(absent.source, &Value::Null);

    let err = resolve_path(r#"0."content"."text""#, &source, &schema).unwrap_err();
    assert!(matches!(err, ResolutionError::UnknownKey { .. }));
}

#[test]
fn union_discriminant_mismatch() {
    let schema = blog_schema();
    let mut source = blog_source();
    source[0]["content"]["type"] = json!("video");
    let err = resolve_path(r#"0."content"."image""#, &source, &schema).unwrap_err();
    assert_eq!(
        err,
        ResolutionError::UnionDiscriminantMismatch {
            path: r#"0."content""#.into(),
            key: "type".into(),
            found: Some("video".into()),
        }
    );
}

#[test]
fn leaves_cannot_be_descended() {
    let schema = blog_schema();
    let source = blog_source();
    let err = resolve_path(r#"0."content"."image"."_ref""#, &source, &schema).unwrap_err();
    assert_eq!(
        err,
        ResolutionError::CannotDescendIntoLeaf {
            path: r#"0."content"."image""#.into(),
            schema_type: "image",
        }
    );
}

#[test]
fn unknown_locale_and_out_of_range() {
    let schema = blog_schema();
    let source = blog_source();
    assert!(matches!(
        resolve_path(r#"0."title"."de""#, &source, &schema),
        Err(ResolutionError::UnknownLocale { .. })
    ));
    assert_eq!(
        resolve_path(r#"3."title""#, &source, &schema),
        Err(ResolutionError::IndexOutOfRange { path: String::new(), index: 3, len: 1 })
    );
}

#[test]
fn all_locales() {
    let schema = blog_schema();
    let source = blog_source();
    let locales = resolve_all_locales(r#"0."title""#, &source, &schema).unwrap();
    let values: Vec<_> = locales.iter().map(|(k, v)| (k.as_str(), v.source.clone())).collect();
    assert_eq!(values, [("en", json!("Hello")), ("nb", json!("Hei"))]);

    let err = resolve_all_locales(r#"0."tags""#, &source, &schema).unwrap_err();
    assert!(matches!(err, ResolutionError::TypeMismatch { expected: "i18n", .. }));
}

#[test]
fn segments_and_string_paths_agree() {
    let schema = blog_schema();
    let source = blog_source();
    let segments = vec![Segment::Index(0), Segment::Key("title".into()), Segment::Key("en".into())];
    assert_eq!(decode_module_path(r#"0."title"."en""#).unwrap(), segments);
    assert_eq!(
        resolve_segments(&segments, &source, &schema).unwrap(),
        resolve_path(r#"0."title"."en""#, &source, &schema).unwrap()
    );
}

#[test]
fn missing_required_key_names_the_full_path() {
    let schema = SerializedSchema::array(SerializedSchema::object([("title", SerializedSchema::string())]));
    let source = json!([{}]);
    let err = resolve_path(r#"0."title""#, &source, &schema).unwrap_err();
    assert_eq!(err, ResolutionError::MissingSource { path: r#"0."title""#.into() });
    assert!(err.is_schema_mismatch());
}

#[test]
fn missing_record_key_names_the_full_path() {
    let schema = blog_schema();
    let source = blog_source();
    let err = resolve_path(r#"0."tags"."go""#, &source, &schema).unwrap_err();
    assert_eq!(err, ResolutionError::MissingSource { path: r#"0."tags"."go""#.into() });

    let record = SerializedSchema::record(SerializedSchema::string());
    let err = resolve_path(r#""x""#, &json!({}), &record).unwrap_err();
    assert_eq!(err, ResolutionError::MissingSource { path: r#""x""#.into() });
}

#[test]
fn missing_locale_names_the_full_path() {
    let schema = blog_schema();
    let source = json!([{ "title": { "en": "Hello" }, "tags": {}, "content": { "type": "text", "text": [] } }]);
    let err = resolve_path(r#"0."title"."nb""#, &source, &schema).unwrap_err();
    assert_eq!(err, ResolutionError::MissingSource { path: r#"0."title"."nb""#.into() });
}
