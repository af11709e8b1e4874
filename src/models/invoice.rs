//! Invoice model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{InvoiceId, PartyId, ProjectId, TransactionId};
use super::money::Money;
use super::validation::{Condition, Record};

/// An invoice sent to a customer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(default)]
    pub id: InvoiceId,

    #[serde(default)]
    pub identifier: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub amount: Money,

    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub customer_id: PartyId,

    #[serde(default)]
    pub send_date: Option<NaiveDate>,

    #[serde(default)]
    pub date_of_settlement: Option<NaiveDate>,

    #[serde(default)]
    pub settlement_transaction_id: TransactionId,

    #[serde(default)]
    pub project_id: ProjectId,

    /// A revoked invoice never produces an occurrence entry
    #[serde(default)]
    pub revoked: bool,
}

impl Invoice {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>, amount: Money) -> Self {
        Self {
            id: InvoiceId::generate(),
            identifier: identifier.into(),
            name: name.into(),
            amount,
            ..Default::default()
        }
    }
}

impl fmt::Display for Invoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invoice {} ({})", self.name, self.identifier)
    }
}

impl Record for Invoice {
    fn kind_name(&self) -> &'static str {
        "Invoice"
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn conditions(&self) -> Vec<Condition> {
        vec![
            Condition::fundamental(self.id.is_unset(), "id is not set"),
            Condition::fundamental(self.identifier.trim().is_empty(), "identifier is not set"),
            Condition::before_export(self.name.trim().is_empty(), "name is not set"),
            Condition::before_export(
                !self.amount.is_positive(),
                format!("amount must be greater than zero (is {})", self.amount),
            ),
            Condition::before_export(self.send_date.is_none(), "send date is not set"),
            Condition::undefined(self.path.trim().is_empty(), "no attachment path set"),
            Condition::before_export(self.customer_id.is_unset(), "no customer set"),
            Condition::before_export(self.project_id.is_unset(), "no project set"),
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
