//! # Identity Newtypes
//!
//! `SchemaId` is the stable identity of one schema document: its logical
//! path below the schema root, `/`-separated, without the `.json`
//! extension (`orders/order-completed-event`). The directory part encodes
//! the target namespace.
//!
//! `NamespacePath` is the ordered list of namespace segments a generated
//! type lives under. Backends decide how to join the segments.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Stable identity of one schema document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SchemaId(String);

static ROOT: SchemaId = SchemaId(String::new());

impl SchemaId {
    /// Build an identity from a logical path.
    ///
    /// Backslashes are normalized to `/`, a leading `./` and a trailing
    /// `.json` are stripped. Empty paths, absolute paths and `..` segments
    /// are rejected.
    pub fn new(path: impl AsRef<str>) -> Result<Self, SchemaError> {
        let raw = path.as_ref();
        let mut normalized = raw.replace('\\', "/");
        while let Some(rest) = normalized.strip_prefix("./") {
            normalized = rest.to_string();
        }
        if let Some(stem) = normalized.strip_suffix(".json") {
            normalized = stem.to_string();
        }

        let reject = |reason: &str| SchemaError::MalformedSchema {
            schema_id: SchemaId(raw.to_string()),
            pointer: String::new(),
            reason: reason.to_string(),
        };

        if normalized.is_empty() {
            return Err(reject("schema identity is empty"));
        }
        if normalized.starts_with('/') {
            return Err(reject("schema identity must be relative to the schema root"));
        }
        if normalized
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(reject("schema identity contains an empty or relative segment"));
        }

        Ok(Self(normalized))
    }

    /// The identity used where no real schema applies.
    pub fn root() -> &'static SchemaId {
        &ROOT
    }

    /// The identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// All `/`-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// The directory segments (every segment except the last).
    pub fn directory_segments(&self) -> Vec<&str> {
        let mut segments: Vec<&str> = self.segments().collect();
        segments.pop();
        segments
    }

    /// The final path segment (`order-completed-event`).
    pub fn file_stem(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Resolve a `$ref` path written inside this schema.
    ///
    /// The reference is interpreted relative to this schema's directory.
    /// Returns `None` when the reference escapes the schema root.
    pub fn resolve_relative(&self, reference: &str) -> Option<SchemaId> {
        let reference = reference.replace('\\', "/");
        let mut stack: Vec<&str> = if reference.starts_with('/') {
            Vec::new()
        } else {
            self.directory_segments()
        };

        for segment in reference.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    stack.pop()?;
                }
                other => stack.push(other),
            }
        }

        SchemaId::new(stack.join("/")).ok()
    }

    /// Identity of an inline fragment nested inside this schema.
    pub fn fragment(&self, pointer: &str) -> SchemaId {
        SchemaId(format!("{}#{}", self.0, pointer))
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered namespace segments for a generated type.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NamespacePath(Vec<String>);

impl NamespacePath {
    /// Build a path from segments. Empty segments are dropped.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            segments
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        )
    }

    /// Parse a dotted path (`Maliev.MessagingContracts`).
    pub fn parse_dotted(dotted: &str) -> Self {
        Self::new(dotted.split('.').map(str::trim))
    }

    /// The segments in order.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a segment, returning the extended path.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        let segment = segment.into();
        if !segment.is_empty() {
            segments.push(segment);
        }
        Self(segments)
    }

    /// Join the segments with `separator`.
    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

impl fmt::Display for NamespacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_paths() {
        let id = SchemaId::new("./orders\\order-completed-event.json").unwrap();
        assert_eq!(id.as_str(), "orders/order-completed-event");
        assert_eq!(id.file_stem(), "order-completed-event");
        assert_eq!(id.directory_segments(), vec!["orders"]);
    }

    #[test]
    fn rejects_escaping_paths() {
        assert!(SchemaId::new("").is_err());
        assert!(SchemaId::new("/abs/path").is_err());
        assert!(SchemaId::new("orders/../base").is_err());
        assert!(SchemaId::new("orders//x").is_err());
    }

    #[test]
    fn resolves_sibling_and_parent_refs() {
        let id = SchemaId::new("orders/order-completed-event").unwrap();
        assert_eq!(
            id.resolve_relative("../base-message.json").unwrap().as_str(),
            "base-message"
        );
        assert_eq!(
            id.resolve_relative("./order-line.json").unwrap().as_str(),
            "orders/order-line"
        );
        assert_eq!(
            id.resolve_relative("/shared/money.json").unwrap().as_str(),
            "shared/money"
        );
        assert!(id.resolve_relative("../../outside.json").is_none());
    }

    #[test]
    fn namespace_path_joins() {
        let ns = NamespacePath::parse_dotted("Maliev.MessagingContracts").child("Orders");
        assert_eq!(ns.join("."), "Maliev.MessagingContracts.Orders");
        assert_eq!(ns.join("::"), "Maliev::MessagingContracts::Orders");
        assert_eq!(ns.to_string(), "Maliev.MessagingContracts.Orders");
        assert!(NamespacePath::new(Vec::<String>::new()).is_empty());
    }
}
