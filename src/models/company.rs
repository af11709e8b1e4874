//! Company model
//!
//! Context for rendering only; nothing in the journal depends on it.

use serde::{Deserialize, Serialize};

use super::validation::{Condition, Record};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Company {
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

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub mail: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub logo_path: String,
}

impl Record for Company {
    fn kind_name(&self) -> &'static str {
        "Company"
    }

    fn identifier(&self) -> &str {
        &self.name
    }

    fn conditions(&self) -> Vec<Condition> {
        vec![
            Condition::undefined(self.name.trim().is_empty(), "company name is not set"),
            Condition::undefined(self.place.trim().is_empty(), "place is not set"),
            Condition::undefined(self.logo_path.trim().is_empty(), "no logo set"),
        ]
    }
}
