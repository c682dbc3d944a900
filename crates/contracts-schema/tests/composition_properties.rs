//! Property tests for composition: effective field order is a pure
//! function of declaration order, and resolution does not depend on the
//! order sources were loaded in.

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use contracts_core::SchemaId;
use contracts_schema::{CompositionResolver, RawSchema, SchemaLoader};

const BASE_FIELDS: [&str; 3] = ["messageId", "timestamp", "correlationId"];

fn base() -> RawSchema {
    let text = json!({
        "type": "object",
        "properties": {
            "messageId": {"type": "string", "format": "uuid"},
            "timestamp": {"type": "string", "format": "date-time"},
            "correlationId": {"type": "string", "format": "uuid"}
        },
        "required": BASE_FIELDS
    });
    RawSchema::new(SchemaId::new("base").unwrap(), text.to_string())
}

fn message(names: &[String]) -> RawSchema {
    let mut properties = Map::new();
    for name in names {
        properties.insert(name.clone(), json!({"type": "number"}));
    }
    let text = json!({
        "allOf": [
            {"$ref": "../base.json"},
            {"type": "object", "properties": Value::Object(properties)}
        ]
    });
    RawSchema::new(SchemaId::new("events/generated").unwrap(), text.to_string())
}

fn unique_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("x[a-z][a-zA-Z0-9]{0,8}", 1..16).prop_map(|names| {
        let mut seen = std::collections::HashSet::new();
        names.into_iter().filter(|n| seen.insert(n.clone())).collect()
    })
}

proptest! {
    /// Envelope fields come first, then the message's own fields in
    /// declaration order.
    #[test]
    fn effective_order_follows_declaration(names in unique_names()) {
        let set = SchemaLoader::new().load(vec![base(), message(&names)]).unwrap();
        let effective = CompositionResolver::new(&set)
            .resolve(&SchemaId::new("events/generated").unwrap())
            .unwrap();

        let expected: Vec<&str> = BASE_FIELDS
            .iter()
            .copied()
            .chain(names.iter().map(String::as_str))
            .collect();
        prop_assert_eq!(effective.field_names(), expected);
    }

    /// Loading the base after the message yields the same result.
    #[test]
    fn load_order_is_irrelevant(names in unique_names()) {
        let id = SchemaId::new("events/generated").unwrap();
        let forward = SchemaLoader::new().load(vec![base(), message(&names)]).unwrap();
        let backward = SchemaLoader::new().load(vec![message(&names), base()]).unwrap();
        prop_assert_eq!(
            CompositionResolver::new(&forward).resolve(&id).unwrap(),
            CompositionResolver::new(&backward).resolve(&id).unwrap()
        );
    }
}
