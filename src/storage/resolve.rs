//! Reference resolution
//!
//! The index maps every Id to the position of its entity. Lookups are O(1);
//! when an Id occurs twice the first occurrence wins (duplicates are rejected
//! at load anyway).

use std::collections::HashMap;

use crate::models::{
    Document, DocumentId, Expense, ExpenseId, Invoice, InvoiceId, MiscId, MiscRecord, Party,
    PartyId, Project, ProjectId, Record, Transaction, TransactionId,
};

use super::repository::Repository;

fn index_by<'a, T>(items: &'a [T], key: impl Fn(&'a T) -> &'a str) -> HashMap<&'a str, usize> {
    let mut index = HashMap::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        let key = key(item);
        if !key.trim().is_empty() {
            index.entry(key).or_insert(position);
        }
    }
    index
}

/// Id lookup tables borrowed from a [`Repository`]
#[derive(Debug)]
pub struct RepositoryIndex<'a> {
    repo: &'a Repository,
    customers: HashMap<&'a str, usize>,
    employees: HashMap<&'a str, usize>,
    projects: HashMap<&'a str, usize>,
    expenses: HashMap<&'a str, usize>,
    invoices: HashMap<&'a str, usize>,
    misc: HashMap<&'a str, usize>,
    transactions: HashMap<&'a str, usize>,
    expense_identifiers: HashMap<&'a str, usize>,
    invoice_identifiers: HashMap<&'a str, usize>,
}

impl<'a> RepositoryIndex<'a> {
    pub fn build(repo: &'a Repository) -> Self {
        Self {
            repo,
            customers: index_by(&repo.customers, |p| p.id.as_str()),
            employees: index_by(&repo.employees, |p| p.id.as_str()),
            projects: index_by(&repo.projects, |p| p.id.as_str()),
            expenses: index_by(&repo.expenses, |e| e.id.as_str()),
            invoices: index_by(&repo.invoices, |i| i.id.as_str()),
            misc: index_by(&repo.misc, |m| m.id.as_str()),
            transactions: index_by(&repo.statement.transactions, |t| t.id.as_str()),
            expense_identifiers: index_by(&repo.expenses, |e| e.identifier.as_str()),
            invoice_identifiers: index_by(&repo.invoices, |i| i.identifier.as_str()),
        }
    }

    pub fn repository(&self) -> &'a Repository {
        self.repo
    }

    pub fn customer(&self, id: &PartyId) -> Option<&'a Party> {
        self.customers
            .get(id.as_str())
            .map(|&i| &self.repo.customers[i])
    }

    pub fn employee(&self, id: &PartyId) -> Option<&'a Party> {
        self.employees
            .get(id.as_str())
            .map(|&i| &self.repo.employees[i])
    }

    /// Customers first, then employees
    pub fn party(&self, id: &PartyId) -> Option<&'a Party> {
        self.customer(id).or_else(|| self.employee(id))
    }

    pub fn project(&self, id: &ProjectId) -> Option<&'a Project> {
        self.projects
            .get(id.as_str())
            .map(|&i| &self.repo.projects[i])
    }

    pub fn expense(&self, id: &ExpenseId) -> Option<&'a Expense> {
        self.expenses
            .get(id.as_str())
            .map(|&i| &self.repo.expenses[i])
    }

    pub fn invoice(&self, id: &InvoiceId) -> Option<&'a Invoice> {
        self.invoices
            .get(id.as_str())
            .map(|&i| &self.repo.invoices[i])
    }

    pub fn misc(&self, id: &MiscId) -> Option<&'a MiscRecord> {
        self.misc.get(id.as_str()).map(|&i| &self.repo.misc[i])
    }

    pub fn transaction(&self, id: &TransactionId) -> Option<&'a Transaction> {
        self.transactions
            .get(id.as_str())
            .map(|&i| &self.repo.statement.transactions[i])
    }

    /// Look a document Id up in expenses, invoices and misc records
    pub fn document(&self, id: &DocumentId) -> Option<Document<'a>> {
        let key = id.as_str();
        if let Some(&i) = self.expenses.get(key) {
            return Some(Document::Expense(&self.repo.expenses[i]));
        }
        if let Some(&i) = self.invoices.get(key) {
            return Some(Document::Invoice(&self.repo.invoices[i]));
        }
        self.misc
            .get(key)
            .map(|&i| Document::Misc(&self.repo.misc[i]))
    }

    pub fn expense_by_identifier(&self, identifier: &str) -> Option<&'a Expense> {
        self.expense_identifiers
            .get(identifier)
            .map(|&i| &self.repo.expenses[i])
    }

    pub fn invoice_by_identifier(&self, identifier: &str) -> Option<&'a Invoice> {
        self.invoice_identifiers
            .get(identifier)
            .map(|&i| &self.repo.invoices[i])
    }
}

/// A non-empty reference without a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Kind of the entity holding the reference
    pub kind: &'static str,
    /// Identifier of the entity holding the reference
    pub identifier: String,
    pub field: &'static str,
    /// Kind of the missing entity
    pub target: &'static str,
    pub id: String,
}

impl DanglingReference {
    pub fn message(&self) -> String {
        format!(
            "{} references unknown {} \"{}\"",
            self.field, self.target, self.id
        )
    }
}

/// Outcome of resolving all references of a repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    pub dangling: Vec<DanglingReference>,
}

impl ResolutionReport {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty()
    }
}

struct Resolver<'r, 'a> {
    index: &'r RepositoryIndex<'a>,
    dangling: Vec<DanglingReference>,
}

impl Resolver<'_, '_> {
    fn check(
        &mut self,
        owner: &dyn Record,
        field: &'static str,
        target: &'static str,
        id: &str,
        found: bool,
    ) {
        if id.trim().is_empty() || found {
            return;
        }
        self.dangling.push(DanglingReference {
            kind: owner.kind_name(),
            identifier: owner.identifier().to_string(),
            field,
            target,
            id: id.to_string(),
        });
    }
}

/// Resolve every reference of the repository.
///
/// Collections are visited in a fixed order and entities in insertion order,
/// so the report is deterministic.
pub fn resolve(repo: &Repository) -> ResolutionReport {
    let index = repo.index();
    let mut r = Resolver {
        index: &index,
        dangling: Vec::new(),
    };

    for project in &repo.projects {
        let found = r.index.customer(&project.customer_id).is_some();
        r.check(project, "customer_id", "customer", project.customer_id.as_str(), found);
    }

    for exp in &repo.expenses {
        let found = r.index.customer(&exp.obliged_customer_id).is_some();
        r.check(exp, "obliged_customer_id", "customer", exp.obliged_customer_id.as_str(), found);
        let found = r.index.employee(&exp.advanced_third_party_id).is_some();
        r.check(
            exp,
            "advanced_third_party_id",
            "employee",
            exp.advanced_third_party_id.as_str(),
            found,
        );
        let found = r.index.transaction(&exp.settlement_transaction_id).is_some();
        r.check(
            exp,
            "settlement_transaction_id",
            "transaction",
            exp.settlement_transaction_id.as_str(),
            found,
        );
        let found = r.index.project(&exp.project_id).is_some();
        r.check(exp, "project_id", "project", exp.project_id.as_str(), found);
    }

    for inv in &repo.invoices {
        let found = r.index.customer(&inv.customer_id).is_some();
        r.check(inv, "customer_id", "customer", inv.customer_id.as_str(), found);
        let found = r.index.transaction(&inv.settlement_transaction_id).is_some();
        r.check(
            inv,
            "settlement_transaction_id",
            "transaction",
            inv.settlement_transaction_id.as_str(),
            found,
        );
        let found = r.index.project(&inv.project_id).is_some();
        r.check(inv, "project_id", "project", inv.project_id.as_str(), found);
    }

    for misc in &repo.misc {
        let found = r.index.transaction(&misc.settlement_transaction_id).is_some();
        r.check(
            misc,
            "settlement_transaction_id",
            "transaction",
            misc.settlement_transaction_id.as_str(),
            found,
        );
    }

    for trn in &repo.statement.transactions {
        let found = r.index.party(&trn.associated_party_id).is_some();
        r.check(trn, "associated_party_id", "party", trn.associated_party_id.as_str(), found);
        let found = r.index.document(&trn.associated_document_id).is_some();
        r.check(
            trn,
            "associated_document_id",
            "document",
            trn.associated_document_id.as_str(),
            found,
        );
    }

    ResolutionReport {
        dangling: r.dangling,
    }
}
