//! Property tests for schema identities and namespace paths.

use contracts_core::{NamespacePath, SchemaId};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,10}"
}

fn logical_path() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment(), 1..5)
}

proptest! {
    /// Normalizing an identity twice changes nothing.
    #[test]
    fn identity_normalization_is_idempotent(segments in logical_path()) {
        let raw = format!("./{}.json", segments.join("\\"));
        let id = SchemaId::new(&raw).unwrap();
        prop_assert_eq!(id.as_str(), segments.join("/"));
        prop_assert_eq!(SchemaId::new(id.as_str()).unwrap(), id);
    }

    /// A sibling reference resolves into the same directory.
    #[test]
    fn sibling_references_stay_in_directory(segments in logical_path(), sibling in segment()) {
        let id = SchemaId::new(segments.join("/")).unwrap();
        let target = id.resolve_relative(&format!("./{sibling}.json")).unwrap();
        prop_assert_eq!(target.directory_segments(), id.directory_segments());
        prop_assert_eq!(target.file_stem(), sibling.as_str());
    }

    /// Climbing above the schema root is refused.
    #[test]
    fn escaping_references_are_refused(segments in logical_path()) {
        let id = SchemaId::new(segments.join("/")).unwrap();
        let target = format!("{}x.json", "../".repeat(segments.len()));
        prop_assert!(id.resolve_relative(&target).is_none());
    }

    /// Dotted namespaces parse back to the same segments.
    #[test]
    fn dotted_namespace_round_trip(segments in prop::collection::vec("[A-Z][A-Za-z0-9]{0,8}", 1..6)) {
        let ns = NamespacePath::parse_dotted(&segments.join("."));
        prop_assert_eq!(ns.segments(), segments.as_slice());
        prop_assert_eq!(ns.to_string(), segments.join("."));
    }
}
