//! Bank statement model

use serde::{Deserialize, Serialize};

use super::ids::TransactionId;
use super::transaction::Transaction;

/// A named bank statement holding its transactions in file order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Statement {
    #[serde(default)]
    pub name: String,

    /// Free-form period label, e.g. `2021`
    #[serde(default)]
    pub period: String,

    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Statement {
    pub fn new(name: impl Into<String>, period: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            period: period.into(),
            transactions: Vec::new(),
        }
    }

    pub fn transaction(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| &t.id == id)
    }

    /// Identifiers of all transactions, for identifier suggestion
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.transactions.iter().map(|t| t.identifier.as_str())
    }
}
