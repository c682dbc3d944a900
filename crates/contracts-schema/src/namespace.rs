//! # Namespace Mapper & Naming
//!
//! Derives the namespace of a generated type from the directory part of its
//! schema identity, and holds the identifier case conversions shared by the
//! IR builder and the backends.
//!
//! `orders/order-completed-event` under root `Maliev.MessagingContracts`
//! maps to `Maliev.MessagingContracts.Orders`. A leading `schemas`
//! directory is not part of the namespace.

use contracts_core::{NamespacePath, SchemaId};

/// Maps schema identities to namespace paths.
#[derive(Debug, Clone, Default)]
pub struct NamespaceMapper {
    root: NamespacePath,
}

impl NamespaceMapper {
    /// A mapper that prefixes every namespace with `root`.
    pub fn new(root: NamespacePath) -> Self {
        Self { root }
    }

    /// The configured root namespace.
    pub fn root(&self) -> &NamespacePath {
        &self.root
    }

    /// Namespace for the type generated from `id`.
    pub fn map(&self, id: &SchemaId) -> NamespacePath {
        let mut dirs = id.directory_segments();
        if dirs.first() == Some(&"schemas") {
            dirs.remove(0);
        }
        dirs.into_iter()
            .fold(self.root.clone(), |ns, dir| ns.child(pascal_case(dir)))
    }
}

/// Type name for a schema: its title, or the PascalCase of its file stem.
pub fn type_name(title: Option<&str>, id: &SchemaId) -> String {
    match title {
        Some(t) if !t.trim().is_empty() => pascal_case(t),
        _ => pascal_case(id.file_stem()),
    }
}

fn words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = input.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        let boundary = c.is_uppercase()
            && !current.is_empty()
            && (chars[i - 1].is_lowercase()
                || chars[i - 1].is_ascii_digit()
                || chars.get(i + 1).is_some_and(|n| n.is_lowercase()));
        if boundary {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// `order-completed event` → `OrderCompletedEvent`; `mlModelVersion` → `MlModelVersion`.
pub fn pascal_case(input: &str) -> String {
    words(input)
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// `actualTotalCost` → `actual_total_cost`; `OrderCompletedEvent` → `order_completed_event`.
pub fn snake_case(input: &str) -> String {
    words(input)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> SchemaId {
        SchemaId::new(s).unwrap()
    }

    #[test]
    fn maps_directories_below_root() {
        let mapper = NamespaceMapper::new(NamespacePath::parse_dotted("Maliev.MessagingContracts"));
        assert_eq!(
            mapper.map(&id("orders/order-completed-event")).to_string(),
            "Maliev.MessagingContracts.Orders"
        );
        assert_eq!(
            mapper.map(&id("schemas/order-lines/x")).to_string(),
            "Maliev.MessagingContracts.OrderLines"
        );
        assert_eq!(mapper.map(&id("base-message")).to_string(), "Maliev.MessagingContracts");
    }

    #[test]
    fn type_names_prefer_titles() {
        assert_eq!(type_name(Some("OrderCompletedEvent"), &id("x/y")), "OrderCompletedEvent");
        assert_eq!(type_name(None, &id("orders/order-completed-event")), "OrderCompletedEvent");
        assert_eq!(type_name(Some("  "), &id("nda-expiring")), "NdaExpiring");
    }

    #[test]
    fn case_conversions() {
        assert_eq!(pascal_case("mlModelVersion"), "MlModelVersion");
        assert_eq!(pascal_case("price breakdown"), "PriceBreakdown");
        assert_eq!(snake_case("actualTotalCost"), "actual_total_cost");
        assert_eq!(snake_case("OrderCompletedEvent"), "order_completed_event");
        assert_eq!(snake_case("HTTPStatus"), "http_status");
        assert_eq!(snake_case("volumeCm3"), "volume_cm3");
        assert_eq!(snake_case("Maliev"), "maliev");
    }
}
