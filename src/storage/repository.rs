//! The in-memory repository
//!
//! A plain value holding every collection in file order. Cross references
//! are stored as Ids only; [`RepositoryIndex`] resolves them.

use crate::config::AccConfig;
use crate::models::{
    Currency, Expense, Invoice, JournalConfig, MiscRecord, Party, PartyKind, Project, Statement,
    Transaction,
};

use super::resolve::{resolve, RepositoryIndex, ResolutionReport};

/// All entities of one repository
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Repository {
    pub config: AccConfig,
    pub expenses: Vec<Expense>,
    pub invoices: Vec<Invoice>,
    pub misc: Vec<MiscRecord>,
    pub customers: Vec<Party>,
    pub employees: Vec<Party>,
    pub projects: Vec<Project>,
    pub statement: Statement,
}

impl Repository {
    /// An empty repository with the given configuration
    pub fn with_config(config: AccConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn currency(&self) -> Currency {
        self.config.currency
    }

    pub fn journal_config(&self) -> &JournalConfig {
        &self.config.journal_config
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.statement.transactions
    }

    /// Build the Id lookup tables for this repository
    pub fn index(&self) -> RepositoryIndex<'_> {
        RepositoryIndex::build(self)
    }

    /// Resolve every reference and report the dangling ones
    pub fn resolve(&self) -> ResolutionReport {
        resolve(self)
    }

    /// Set the party kinds from the collections they are stored in
    pub fn normalize_party_kinds(&mut self) {
        for customer in &mut self.customers {
            customer.kind = PartyKind::Customer;
        }
        for employee in &mut self.employees {
            employee.kind = PartyKind::Employee;
        }
    }
}
