//! Party model
//!
//! Customers and employees share one shape and are kept in two disjoint
//! collections.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::PartyId;
use super::validation::{Condition, Record};

/// Whether a party is a customer or an employee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    #[default]
    Customer,
    Employee,
}

impl fmt::Display for PartyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer => write!(f, "Customer"),
            Self::Employee => write!(f, "Employee"),
        }
    }
}

/// A customer or an employee with a postal address
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Party {
    #[serde(default)]
    pub id: PartyId,

    #[serde(default)]
    pub identifier: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub street: String,

    #[serde(default)]
    pub street_nr: String,

    #[serde(default)]
    pub postal_code: String,

    #[serde(default)]
    pub place: String,

    /// Derived from the collection the party is stored in
    #[serde(skip)]
    pub kind: PartyKind,
}

impl Party {
    /// Create a new party with a fresh Id
    pub fn new(kind: PartyKind, identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: PartyId::generate(),
            identifier: identifier.into(),
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    /// `Name (Identifier)`, the form used in journal descriptions
    pub fn short_label(&self) -> String {
        format!("{} ({})", self.name, self.identifier)
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.short_label())
    }
}

impl Record for Party {
    fn kind_name(&self) -> &'static str {
        match self.kind {
            PartyKind::Customer => "Customer",
            PartyKind::Employee => "Employee",
        }
    }

    fn identifier(&self) -> &str {
        if self.identifier.is_empty() {
            &self.name
        } else {
            &self.identifier
        }
    }

    fn conditions(&self) -> Vec<Condition> {
        vec![
            Condition::fundamental(self.id.is_unset(), "id is not set"),
            Condition::fundamental(self.identifier.trim().is_empty(), "identifier is not set"),
            Condition::before_export(self.name.trim().is_empty(), "name is not set"),
            Condition::undefined(self.street.trim().is_empty(), "street is not set"),
            Condition::undefined(self.postal_code.trim().is_empty(), "postal code is not set"),
            Condition::undefined(self.place.trim().is_empty(), "place is not set"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::validation::FlawLevel;

    #[test]
    fn test_new_party() {
        let party = Party::new(PartyKind::Employee, "p-01", "Kai");
        assert!(!party.id.is_unset());
        assert_eq!(party.short_label(), "Kai (p-01)");
        assert_eq!(party.kind_name(), "Employee");
    }

    #[test]
    fn test_missing_address_is_informational() {
        let party = Party::new(PartyKind::Customer, "c-1", "ACME");
        let result = party.validate();
        assert!(!result.is_valid());
        assert!(result
            .flaws
            .iter()
            .all(|f| f.level == FlawLevel::Undefined));
    }

    #[test]
    fn test_kind_is_not_serialized() {
        let party = Party::new(PartyKind::Employee, "p-01", "Kai");
        let yaml = serde_yaml::to_string(&party).unwrap();
        assert!(!yaml.contains("kind"));
    }
}
