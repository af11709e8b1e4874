//! Strongly-typed Id wrappers for all entity types
//!
//! Ids are opaque strings written once at creation (a v4 UUID for anything
//! created by acc, but hand-written files may use any unique string). An
//! empty Id means the reference is unset.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Macro to generate Id newtype wrappers
macro_rules! define_id {
    ($name:ident, $entity:literal) => {
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Human readable name of the entity this Id points to
            pub const ENTITY: &'static str = $entity;

            /// Create a new random Id
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Wrap an existing Id string
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The empty Id, meaning "no reference"
            pub fn unset() -> Self {
                Self(String::new())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether this Id is empty (an unset reference)
            pub fn is_unset(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(PartyId, "party");
define_id!(ProjectId, "project");
define_id!(ExpenseId, "expense");
define_id!(InvoiceId, "invoice");
define_id!(MiscId, "misc record");
define_id!(TransactionId, "transaction");
define_id!(DocumentId, "document");

impl From<&ExpenseId> for DocumentId {
    fn from(id: &ExpenseId) -> Self {
        Self(id.0.clone())
    }
}

impl From<&InvoiceId> for DocumentId {
    fn from(id: &InvoiceId) -> Self {
        Self(id.0.clone())
    }
}

impl From<&MiscId> for DocumentId {
    fn from(id: &MiscId) -> Self {
        Self(id.0.clone())
    }
}

/// Identifier prefixes by entity kind
pub const EXPENSE_PREFIX: &str = "e-";
pub const INVOICE_PREFIX: &str = "i-";
pub const MISC_PREFIX: &str = "m-";
pub const PROJECT_PREFIX: &str = "p-";
pub const TRANSACTION_PREFIX: &str = "t-";

/// Suggest the next free Identifier for a collection.
///
/// Takes the highest trailing number over all existing Identifiers and adds
/// one, so `["t-3", "t-21-7"]` with prefix `t-` yields `t-8`.
pub fn suggest_next_identifier<'a, I>(existing: I, prefix: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let highest = existing
        .into_iter()
        .filter_map(trailing_number)
        .max()
        .unwrap_or(0);
    format!("{}{}", prefix, highest.saturating_add(1))
}

fn trailing_number(identifier: &str) -> Option<u64> {
    let digits: String = identifier
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = ExpenseId::generate();
        let b = ExpenseId::generate();
        assert!(!a.is_unset());
        assert_ne!(a, b);
    }

    #[test]
    fn test_default_is_unset() {
        assert!(PartyId::default().is_unset());
        assert!(PartyId::new("  ").is_unset());
        assert!(!PartyId::new("u1").is_unset());
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = TransactionId::new("t1");
        assert_eq!(serde_yaml::to_string(&id).unwrap().trim(), "t1");
        let back: TransactionId = serde_yaml::from_str("t1").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_document_id_from_typed_ids() {
        let expense = ExpenseId::new("x");
        assert_eq!(DocumentId::from(&expense).as_str(), "x");
    }

    #[test]
    fn test_suggest_next_identifier() {
        let existing = ["t-3", "t-21-7", "t-2"];
        assert_eq!(
            suggest_next_identifier(existing.iter().copied(), TRANSACTION_PREFIX),
            "t-8"
        );
        assert_eq!(
            suggest_next_identifier(std::iter::empty(), EXPENSE_PREFIX),
            "e-1"
        );
    }

    #[test]
    fn test_suggest_saturates_at_the_largest_number() {
        let highest = format!("t-{}", u64::MAX);
        assert_eq!(
            suggest_next_identifier([highest.as_str()], TRANSACTION_PREFIX),
            highest
        );
    }

    #[test]
    fn test_suggest_ignores_identifiers_without_number() {
        let existing = ["e-x", "e-4"];
        assert_eq!(suggest_next_identifier(existing.iter().copied(), "e-"), "e-5");
    }
}
