//! Settlable documents
//!
//! Expenses, invoices and misc records can all be settled by a transaction.
//! `Document` borrows one of them and exposes the shape they share.

use chrono::NaiveDate;
use std::fmt;

use super::expense::Expense;
use super::ids::{DocumentId, TransactionId};
use super::invoice::Invoice;
use super::misc::MiscRecord;
use super::money::Money;

/// A borrowed expense, invoice or misc record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document<'a> {
    Expense(&'a Expense),
    Invoice(&'a Invoice),
    Misc(&'a MiscRecord),
}

impl<'a> Document<'a> {
    pub fn id(&self) -> DocumentId {
        match self {
            Self::Expense(e) => DocumentId::from(&e.id),
            Self::Invoice(i) => DocumentId::from(&i.id),
            Self::Misc(m) => DocumentId::from(&m.id),
        }
    }

    pub fn identifier(&self) -> &'a str {
        match self {
            Self::Expense(e) => &e.identifier,
            Self::Invoice(i) => &i.identifier,
            Self::Misc(m) => &m.identifier,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            Self::Expense(e) => &e.name,
            Self::Invoice(i) => &i.name,
            Self::Misc(m) => &m.name,
        }
    }

    /// Misc records carry no amount
    pub fn amount(&self) -> Option<Money> {
        match self {
            Self::Expense(e) => Some(e.amount),
            Self::Invoice(i) => Some(i.amount),
            Self::Misc(_) => None,
        }
    }

    pub fn path(&self) -> &'a str {
        match self {
            Self::Expense(e) => &e.path,
            Self::Invoice(i) => &i.path,
            Self::Misc(m) => &m.path,
        }
    }

    /// Accrual, send or received date
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Expense(e) => e.date_of_accrual,
            Self::Invoice(i) => i.send_date,
            Self::Misc(m) => m.date,
        }
    }

    pub fn settlement_transaction_id(&self) -> &'a TransactionId {
        match self {
            Self::Expense(e) => &e.settlement_transaction_id,
            Self::Invoice(i) => &i.settlement_transaction_id,
            Self::Misc(m) => &m.settlement_transaction_id,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Expense(_) => "expense",
            Self::Invoice(_) => "invoice",
            Self::Misc(_) => "misc record",
        }
    }
}

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expense(e) => fmt::Display::fmt(e, f),
            Self::Invoice(i) => fmt::Display::fmt(i, f),
            Self::Misc(m) => fmt::Display::fmt(m, f),
        }
    }
}
