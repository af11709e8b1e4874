//! Repository validation
//!
//! Collects every active condition of every entity plus the checks that need
//! the whole repository: duplicate identifiers, unknown expense categories,
//! foreign currencies and dangling references.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{AccError, AccResult};
use crate::events::{EngineEvent, EventSink};
use crate::models::{FlawLevel, Money, Record};
use crate::storage::Repository;

/// One line of the validation report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub kind: String,
    pub identifier: String,
    pub reason: String,
    pub level: FlawLevel,
}

impl ReportRow {
    fn new(kind: &str, identifier: &str, reason: impl Into<String>, level: FlawLevel) -> Self {
        Self {
            kind: kind.to_string(),
            identifier: identifier.to_string(),
            reason: reason.into(),
            level,
        }
    }
}

/// All flaws of a repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub rows: Vec<ReportRow>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Most severe first; rows of one level keep their order
    pub fn sort_by_level(&mut self) {
        self.rows.sort_by_key(|row| row.level);
    }

    /// Rows that block a command gated at `gate`
    pub fn blocking(&self, gate: FlawLevel) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(move |row| row.level.blocks(gate))
    }

    pub fn has_fundamental(&self) -> bool {
        self.blocking(FlawLevel::Fundamental).next().is_some()
    }

    /// Refuse a command while flaws of its gate level (or worse) exist
    pub fn gate(&self, command: &'static str, gate: FlawLevel, force: bool) -> AccResult<()> {
        let count = self.blocking(gate).count();
        if count == 0 || force {
            return Ok(());
        }
        Err(AccError::Gated {
            command,
            level: gate.to_string(),
            count,
        })
    }
}

/// Builds the validation report of one repository
pub struct ValidationService<'a> {
    repo: &'a Repository,
}

impl<'a> ValidationService<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self { repo }
    }

    /// Validate everything, reporting dangling references to `sink`
    pub fn validate(&self, sink: &dyn EventSink) -> ValidationReport {
        let mut report = ValidationReport::default();

        self.entity_flaws(&mut report);
        self.duplicate_identifiers(&mut report);
        self.unknown_categories(&mut report);
        self.foreign_currencies(&mut report);

        for dangling in self.repo.resolve().dangling {
            sink.emit(EngineEvent::DanglingReference {
                owner: format!("{} {}", dangling.kind, dangling.identifier),
                field: dangling.field.to_string(),
                target: dangling.target.to_string(),
                id: dangling.id.clone(),
            });
            report.rows.push(ReportRow::new(
                dangling.kind,
                &dangling.identifier,
                dangling.message(),
                FlawLevel::BeforeMerge,
            ));
        }

        report
    }

    fn push_flaws(report: &mut ValidationReport, record: &dyn Record) {
        let result = record.validate();
        for flaw in result.flaws {
            report
                .rows
                .push(ReportRow::new(result.kind, &result.name, flaw.reason, flaw.level));
        }
    }

    fn entity_flaws(&self, report: &mut ValidationReport) {
        let repo = self.repo;
        Self::push_flaws(report, &repo.config.company);
        Self::push_flaws(report, &repo.config.journal_config);
        for party in repo.customers.iter().chain(&repo.employees) {
            Self::push_flaws(report, party);
        }
        for project in &repo.projects {
            Self::push_flaws(report, project);
        }
        for exp in &repo.expenses {
            Self::push_flaws(report, exp);
        }
        for inv in &repo.invoices {
            Self::push_flaws(report, inv);
        }
        for misc in &repo.misc {
            Self::push_flaws(report, misc);
        }
        for trn in &repo.statement.transactions {
            Self::push_flaws(report, trn);
        }
    }

    fn duplicate_identifiers(&self, report: &mut ValidationReport) {
        let repo = self.repo;
        check_duplicates(report, "Customer", repo.customers.iter().map(|p| p.identifier.as_str()));
        check_duplicates(report, "Employee", repo.employees.iter().map(|p| p.identifier.as_str()));
        check_duplicates(report, "Project", repo.projects.iter().map(|p| p.identifier.as_str()));
        check_duplicates(report, "Expense", repo.expenses.iter().map(|e| e.identifier.as_str()));
        check_duplicates(report, "Invoice", repo.invoices.iter().map(|i| i.identifier.as_str()));
        check_duplicates(report, "Misc", repo.misc.iter().map(|m| m.identifier.as_str()));
        check_duplicates(
            report,
            "Transaction",
            repo.statement.transactions.iter().map(|t| t.identifier.as_str()),
        );
    }

    fn unknown_categories(&self, report: &mut ValidationReport) {
        let config = self.repo.journal_config();
        for exp in &self.repo.expenses {
            if exp.expense_category.trim().is_empty() {
                continue;
            }
            if let Err(reason) = config.category_by_name(&exp.expense_category) {
                report.rows.push(ReportRow::new(
                    "Expense",
                    &exp.identifier,
                    reason,
                    FlawLevel::BeforeExport,
                ));
            }
        }
    }

    fn foreign_currencies(&self, report: &mut ValidationReport) {
        let currency = self.repo.currency();
        let mut check = |kind: &str, identifier: &str, amount: Money| {
            if amount.currency() != currency {
                report.rows.push(ReportRow::new(
                    kind,
                    identifier,
                    format!("amount {} is not in the repository currency {}", amount, currency),
                    FlawLevel::Fundamental,
                ));
            }
        };
        for exp in &self.repo.expenses {
            check("Expense", &exp.identifier, exp.amount);
        }
        for inv in &self.repo.invoices {
            check("Invoice", &inv.identifier, inv.amount);
        }
        for trn in &self.repo.statement.transactions {
            check("Transaction", &trn.identifier, trn.amount);
        }
    }
}

/// One fundamental row per identifier used more than once
fn check_duplicates<'i>(
    report: &mut ValidationReport,
    kind: &str,
    identifiers: impl Iterator<Item = &'i str>,
) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for identifier in identifiers {
        if !identifier.trim().is_empty() {
            *counts.entry(identifier).or_default() += 1;
        }
    }
    for (identifier, count) in counts {
        if count > 1 {
            report.rows.push(ReportRow::new(
                kind,
                identifier,
                format!("identifier \"{}\" is used {} times", identifier, count),
                FlawLevel::Fundamental,
            ));
        }
    }
}
