//! Project model

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{PartyId, ProjectId};
use super::validation::{Condition, Record};

/// A customer project; expenses and invoices may belong to one
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub id: ProjectId,

    #[serde(default)]
    pub identifier: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub customer_id: PartyId,
}

impl Project {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>, customer_id: PartyId) -> Self {
        Self {
            id: ProjectId::generate(),
            identifier: identifier.into(),
            name: name.into(),
            customer_id,
        }
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "project {} ({})", self.name, self.identifier)
    }
}

impl Record for Project {
    fn kind_name(&self) -> &'static str {
        "Project"
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn conditions(&self) -> Vec<Condition> {
        vec![
            Condition::fundamental(self.id.is_unset(), "id is not set"),
            Condition::fundamental(self.identifier.trim().is_empty(), "identifier is not set"),
            Condition::before_export(self.name.trim().is_empty(), "name is not set"),
            Condition::before_export(self.customer_id.is_unset(), "no customer set"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_without_customer_is_flawed() {
        let project = Project::new("p-1", "Website", PartyId::unset());
        let result = project.validate();
        assert_eq!(result.flaws.len(), 1);
        assert_eq!(result.flaws[0].reason, "no customer set");
    }
}
