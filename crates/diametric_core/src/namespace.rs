//! Namespace qualification of idents.

use convert_case::{Case, Casing};
use diametric_edn::Keyword;

/// Builds the qualified ident `namespace/local`.
pub fn qualify(namespace: &str, local: &str) -> Keyword {
    Keyword::namespaced(namespace, local)
}

/// Derives the attribute namespace for an entity type name.
///
/// Each path segment is snake-cased and nesting separators (`::` or `/`)
/// become `.`: `Models::UserAccount` gives `models.user_account`.
pub fn prefix_for(type_name: &str) -> String {
    type_name
        .split("::")
        .flat_map(|segment| segment.split('/'))
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_case(Case::Snake))
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualify_joins_with_slash() {
        let ident = qualify("person", "name");
        assert_eq!(ident.to_string(), ":person/name");
        assert_eq!(ident.namespace(), Some("person"));
    }

    #[test]
    fn prefix_for_simple_type() {
        assert_eq!(prefix_for("Person"), "person");
        assert_eq!(prefix_for("UserAccount"), "user_account");
    }

    #[test]
    fn prefix_for_nested_type() {
        assert_eq!(prefix_for("Models::UserAccount"), "models.user_account");
        assert_eq!(prefix_for("billing/Invoice"), "billing.invoice");
        assert_eq!(prefix_for("::Person"), "person");
    }
}
