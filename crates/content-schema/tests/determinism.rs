use content_path::{encode_module_path, Segment};
use content_schema::{resolve_path, ResolutionError, SerializedSchema};
use proptest::prelude::*;
use serde_json::{json, Value};

fn entry_schema() -> SerializedSchema {
    SerializedSchema::array(SerializedSchema::object([
        ("title", SerializedSchema::string()),
        ("count", SerializedSchema::number().optional()),
    ]))
}

fn arb_entry() -> impl Strategy<Value = Value> {
    ("[a-z .\"]{0,8}", prop::option::of(any::<i32>())).prop_map(|(title, count)| match count {
        Some(n) => json!({ "title": title, "count": n }),
        None => json!({ "title": title }),
    })
}

fn arb_segments() -> impl Strategy<Value = Vec<Segment>> {
    (0usize..8, prop::sample::select(vec!["title", "count"])).prop_map(|(i, key)| {
        vec![Segment::Index(i), Segment::key(key)]
    })
}

proptest! {
    #[test]
    fn resolving_twice_gives_the_same_answer(
        source in prop::collection::vec(arb_entry(), 0..6).prop_map(Value::Array),
        segments in arb_segments(),
    ) {
        let schema = entry_schema();
        let path = encode_module_path(&segments);
        let first = resolve_path(&path, &source, &schema);
        let second = resolve_path(&path, &source, &schema);
        prop_assert_eq!(&first, &second);

        let (Segment::Index(i), Some(key)) = (&segments[0], segments[1].as_key()) else {
            unreachable!()
        };
        match first {
            Ok(resolved) => {
                let expected = source[*i].get(key).unwrap_or(&Value::Null);
                prop_assert_eq!(resolved.source, expected);
            }
            Err(err) => {
                let len = source.as_array().map_or(0, Vec::len);
                prop_assert!(*i >= len, "unexpected error {}", err);
                prop_assert_eq!(err, ResolutionError::IndexOutOfRange { path: String::new(), index: *i, len });
            }
        }
    }
}
