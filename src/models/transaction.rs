//! Transaction model
//!
//! A single movement on the bank statement, either incoming (credit) or
//! outgoing (debit). Amounts are always positive; the kind carries the
//! direction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{DocumentId, PartyId, TransactionId};
use super::money::Money;
use super::validation::{Condition, Record};

/// Direction of a bank movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Incoming money
    #[default]
    Credit,
    /// Outgoing money
    Debit,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credit => write!(f, "credit"),
            Self::Debit => write!(f, "debit"),
        }
    }
}

/// How the journal entry for a transaction came about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    /// Linked (or left unlinked) by hand
    #[default]
    Manual,
    /// Linked by the reconciliation pass
    Auto,
}

/// A bank transaction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: TransactionId,

    #[serde(default)]
    pub identifier: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub kind: TransactionKind,

    #[serde(default)]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub amount: Money,

    #[serde(default)]
    pub associated_party_id: PartyId,

    #[serde(default)]
    pub associated_document_id: DocumentId,

    #[serde(default)]
    pub journal_mode: JournalMode,

    /// Reference supplied by the importer, used to drop double imports
    #[serde(default)]
    pub external_ref: String,
}

impl Transaction {
    /// Create a new transaction with a fresh Id
    pub fn new(
        identifier: impl Into<String>,
        kind: TransactionKind,
        date: NaiveDate,
        amount: Money,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            identifier: identifier.into(),
            kind,
            date: Some(date),
            amount,
            ..Default::default()
        }
    }

    pub fn is_credit(&self) -> bool {
        self.kind == TransactionKind::Credit
    }

    pub fn is_debit(&self) -> bool {
        self.kind == TransactionKind::Debit
    }

    /// Whether a document has been linked to this transaction
    pub fn has_document(&self) -> bool {
        !self.associated_document_id.is_unset()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            TransactionKind::Credit => "received",
            TransactionKind::Debit => "paid",
        };
        let date = self
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unknown date".to_string());
        write!(f, "{}: {} {} at {}", self.identifier, verb, self.amount, date)
    }
}

impl Record for Transaction {
    fn kind_name(&self) -> &'static str {
        "Transaction"
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn conditions(&self) -> Vec<Condition> {
        vec![
            Condition::fundamental(self.id.is_unset(), "id is not set"),
            Condition::fundamental(self.identifier.trim().is_empty(), "identifier is not set"),
            Condition::before_export(
                !self.amount.is_positive(),
                format!("amount must be greater than zero (is {})", self.amount),
            ),
            Condition::before_export(self.date.is_none(), "date is not set"),
            Condition::undefined(self.description.trim().is_empty(), "description is empty"),
            Condition::before_export(
                self.journal_mode == JournalMode::Auto
                    && (self.associated_party_id.is_unset() || self.associated_document_id.is_unset()),
                "auto journal mode requires an associated party and an associated document",
            ),
        ]
    }
}
