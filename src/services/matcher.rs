//! Transaction to document matching
//!
//! A transaction is linked to a document when its description names exactly
//! one document identifier (`e-21-3`, `i-2021-04`, `e-7`). Invoices win over
//! expenses when both carry the identifier. The matcher never mutates
//! anything; [`super::ReconciliationService`] applies its results.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{Document, Party, Transaction};
use crate::storage::{Repository, RepositoryIndex};

re!(document_identifier, r"\b([ei]-(?:[^\s]*-)?\d+)(?:\s|$)");

/// Distinct document identifiers in a description, in order of appearance
pub fn document_identifiers(description: &str) -> Vec<&str> {
    let mut found: Vec<&str> = Vec::new();
    for captures in document_identifier().captures_iter(description) {
        if let Some(m) = captures.get(1) {
            if !found.contains(&m.as_str()) {
                found.push(m.as_str());
            }
        }
    }
    found
}

/// Looks up documents and parties for transactions of one repository
pub struct Matcher<'a> {
    index: RepositoryIndex<'a>,
}

impl<'a> Matcher<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self {
            index: repo.index(),
        }
    }

    pub fn index(&self) -> &RepositoryIndex<'a> {
        &self.index
    }

    /// The document a transaction's description points to, if unambiguous
    pub fn document_for(&self, trn: &Transaction) -> Option<Document<'a>> {
        match document_identifiers(&trn.description).as_slice() {
            [identifier] => self.document_by_identifier(identifier),
            _ => None,
        }
    }

    fn document_by_identifier(&self, identifier: &str) -> Option<Document<'a>> {
        if let Some(inv) = self.index.invoice_by_identifier(identifier) {
            return Some(Document::Invoice(inv));
        }
        self.index
            .expense_by_identifier(identifier)
            .map(Document::Expense)
    }

    /// First party whose name occurs in the description, customers first.
    ///
    /// Case-sensitive; parties without a name never match.
    pub fn party_for(&self, description: &str) -> Option<&'a Party> {
        let repo = self.index.repository();
        repo.customers
            .iter()
            .chain(&repo.employees)
            .find(|party| !party.name.is_empty() && description.contains(party.name.as_str()))
    }
}
