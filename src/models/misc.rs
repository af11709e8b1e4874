//! Miscellaneous records
//!
//! Anything with a paper trail that is neither an expense nor an invoice,
//! e.g. a bank fee notice or a tax statement. Only its settlement ever shows
//! up in the journal.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{MiscId, TransactionId};
use super::validation::{Condition, Record};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MiscRecord {
    #[serde(default)]
    pub id: MiscId,

    #[serde(default)]
    pub identifier: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub path: String,

    /// Date the record was received
    #[serde(default)]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub date_of_settlement: Option<NaiveDate>,

    #[serde(default)]
    pub settlement_transaction_id: TransactionId,
}

impl MiscRecord {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: MiscId::generate(),
            identifier: identifier.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

impl fmt::Display for MiscRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "misc record {} ({})", self.name, self.identifier)
    }
}

impl Record for MiscRecord {
    fn kind_name(&self) -> &'static str {
        "Misc"
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn conditions(&self) -> Vec<Condition> {
        vec![
            Condition::fundamental(self.id.is_unset(), "id is not set"),
            Condition::fundamental(self.identifier.trim().is_empty(), "identifier is not set"),
            Condition::before_export(self.name.trim().is_empty(), "name is not set"),
            Condition::before_export(self.date.is_none(), "received date is not set"),
            Condition::undefined(self.path.trim().is_empty(), "no attachment path set"),
            Condition::before_export(
                self.date_of_settlement.is_some() && self.settlement_transaction_id.is_unset(),
                "settlement date is set but no settlement transaction is referenced",
            ),
            Condition::before_export(
                self.date_of_settlement.is_none() && !self.settlement_transaction_id.is_unset(),
                "settlement transaction is referenced but no settlement date is set",
            ),
        ]
    }
}
