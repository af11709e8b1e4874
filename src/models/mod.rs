//! Core data models for acc
//!
//! Parties, projects, documents (expenses, invoices, misc records), bank
//! transactions and the journal configuration, plus the value types they are
//! built from.

pub mod company;
pub mod document;
pub mod expense;
pub mod ids;
pub mod invoice;
pub mod journal_config;
pub mod misc;
pub mod money;
pub mod party;
pub mod project;
pub mod statement;
pub mod transaction;
pub mod validation;

pub use company::Company;
pub use document::Document;
pub use expense::Expense;
pub use ids::{
    suggest_next_identifier, DocumentId, ExpenseId, InvoiceId, MiscId, PartyId, ProjectId,
    TransactionId,
};
pub use invoice::Invoice;
pub use journal_config::{AccountAlias, ExpenseCategory, JournalConfig};
pub use misc::MiscRecord;
pub use money::{Currency, Money, MoneyParseError};
pub use party::{Party, PartyKind};
pub use project::Project;
pub use statement::Statement;
pub use transaction::{JournalMode, Transaction, TransactionKind};
pub use validation::{Condition, Flaw, FlawLevel, Record, ValidationResult};
