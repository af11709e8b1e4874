//! Filtering and sorting of documents and transactions
//!
//! Filtering never touches its input; it returns a new repository holding
//! only the records that pass. Parties, projects and configuration are
//! carried over unchanged.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::error::{AccError, AccResult};
use crate::models::{Expense, Invoice, MiscRecord, Transaction};
use crate::storage::Repository;

/// The record collections a filter can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Expense,
    Invoice,
    Misc,
    Transaction,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Expense,
        RecordKind::Invoice,
        RecordKind::Misc,
        RecordKind::Transaction,
    ];
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expense => write!(f, "expense"),
            Self::Invoice => write!(f, "invoice"),
            Self::Misc => write!(f, "misc"),
            Self::Transaction => write!(f, "transaction"),
        }
    }
}

impl FromStr for RecordKind {
    type Err = AccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" | "expenses" | "e" => Ok(Self::Expense),
            "invoice" | "invoices" | "i" => Ok(Self::Invoice),
            "misc" | "m" => Ok(Self::Misc),
            "transaction" | "transactions" | "t" => Ok(Self::Transaction),
            other => Err(AccError::Validation(format!(
                "unknown record kind '{}' (expected expense, invoice, misc or transaction)",
                other
            ))),
        }
    }
}

/// What to keep
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Inclusive lower date bound
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound
    pub to: Option<NaiveDate>,
    pub identifier: Option<Regex>,
    /// Empty means every kind
    pub kinds: Vec<RecordKind>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one calendar year
    pub fn year(year: i32) -> Self {
        Self {
            from: NaiveDate::from_ymd_opt(year, 1, 1),
            to: NaiveDate::from_ymd_opt(year, 12, 31),
            ..Default::default()
        }
    }

    pub fn with_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Keep only records whose identifier matches `pattern`
    pub fn with_identifier(mut self, pattern: &str) -> AccResult<Self> {
        self.identifier = Some(Regex::new(pattern)?);
        Ok(self)
    }

    pub fn with_kinds(mut self, kinds: Vec<RecordKind>) -> Self {
        self.kinds = kinds;
        self
    }

    /// No bound, no pattern, every kind
    pub fn is_empty(&self) -> bool {
        self.from.is_none()
            && self.to.is_none()
            && self.identifier.is_none()
            && (self.kinds.is_empty() || RecordKind::ALL.iter().all(|k| self.kinds.contains(k)))
    }

    fn includes(&self, kind: RecordKind) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }

    /// Undated records only pass when there is no date bound
    fn date_passes(&self, date: Option<NaiveDate>) -> bool {
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }

    fn identifier_passes(&self, identifier: &str) -> bool {
        self.identifier
            .as_ref()
            .map_or(true, |re| re.is_match(identifier))
    }

    fn keep<T, D, I>(&self, kind: RecordKind, items: &[T], date: D, identifier: I) -> Vec<T>
    where
        T: Clone,
        D: Fn(&T) -> Option<NaiveDate>,
        I: Fn(&T) -> &str,
    {
        if !self.includes(kind) {
            return Vec::new();
        }
        items
            .iter()
            .filter(|&item| self.date_passes(date(item)) && self.identifier_passes(identifier(item)))
            .cloned()
            .collect()
    }
}

/// The records that passed a filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expenses: Vec<Expense>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invoices: Vec<Invoice>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub misc: Vec<MiscRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transactions: Vec<Transaction>,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.expenses.len() + self.invoices.len() + self.misc.len() + self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A filtered copy of the repository; the input comes back unchanged when
/// the criteria are empty
pub fn filter(repo: &Repository, criteria: &FilterCriteria) -> Repository {
    if criteria.is_empty() {
        return repo.clone();
    }
    let mut filtered = repo.clone();
    filtered.expenses = criteria.keep(
        RecordKind::Expense,
        &repo.expenses,
        |e| e.date_of_accrual,
        |e| e.identifier.as_str(),
    );
    filtered.invoices = criteria.keep(
        RecordKind::Invoice,
        &repo.invoices,
        |i| i.send_date,
        |i| i.identifier.as_str(),
    );
    filtered.misc = criteria.keep(RecordKind::Misc, &repo.misc, |m| m.date, |m| m.identifier.as_str());
    filtered.statement.transactions = criteria.keep(
        RecordKind::Transaction,
        &repo.statement.transactions,
        |t| t.date,
        |t| t.identifier.as_str(),
    );
    filtered
}

/// Only the records of one calendar year
pub fn filter_year(repo: &Repository, year: i32) -> Repository {
    filter(repo, &FilterCriteria::year(year))
}

/// The filtered records, without parties and configuration
pub fn select(repo: &Repository, criteria: &FilterCriteria) -> Selection {
    let filtered = filter(repo, criteria);
    Selection {
        expenses: filtered.expenses,
        invoices: filtered.invoices,
        misc: filtered.misc,
        transactions: filtered.statement.transactions,
    }
}

/// Sort every collection by its date, undated records first. Ties keep
/// their order.
pub fn sort_by_date(selection: &mut Selection) {
    selection.expenses.sort_by_key(|e| e.date_of_accrual);
    selection.invoices.sort_by_key(|i| i.send_date);
    selection.misc.sort_by_key(|m| m.date);
    selection.transactions.sort_by_key(|t| t.date);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, TransactionKind};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(identifier: &str, accrual: Option<NaiveDate>) -> Expense {
        let mut exp = Expense::new(identifier, "Cables", Money::chf(100));
        exp.date_of_accrual = accrual;
        exp
    }

    fn repo() -> Repository {
        let mut repo = Repository::default();
        repo.expenses = vec![
            expense("e-21-2", Some(date(2021, 6, 1))),
            expense("e-20-9", Some(date(2020, 12, 31))),
            expense("e-21-1", Some(date(2021, 1, 1))),
            expense("e-x-1", None),
        ];
        let mut inv = Invoice::new("i-21-1", "Web Site", Money::chf(100));
        inv.send_date = Some(date(2021, 4, 1));
        repo.invoices.push(inv);
        repo.statement.transactions.push(Transaction::new(
            "t-21-7",
            TransactionKind::Debit,
            date(2022, 1, 3),
            Money::chf(100),
        ));
        repo
    }

    fn identifiers(exps: &[Expense]) -> Vec<&str> {
        exps.iter().map(|e| e.identifier.as_str()).collect()
    }

    #[test]
    fn test_empty_criteria_return_input_unchanged() {
        let repo = repo();
        assert_eq!(filter(&repo, &FilterCriteria::new()), repo);
        assert_eq!(
            filter(&repo, &FilterCriteria::new().with_kinds(RecordKind::ALL.to_vec())),
            repo
        );
    }

    #[test]
    fn test_date_range_is_inclusive_and_keeps_order() {
        let repo = repo();
        let criteria = FilterCriteria::new().with_range(Some(date(2021, 1, 1)), Some(date(2021, 6, 1)));
        let filtered = filter(&repo, &criteria);
        assert_eq!(identifiers(&filtered.expenses), vec!["e-21-2", "e-21-1"]);
        assert_eq!(filtered.invoices.len(), 1);
        assert!(filtered.statement.transactions.is_empty());
    }

    #[test]
    fn test_open_ended_range() {
        let repo = repo();
        let criteria = FilterCriteria::new().with_range(Some(date(2021, 1, 1)), None);
        assert_eq!(filter(&repo, &criteria).statement.transactions.len(), 1);
    }

    #[test]
    fn test_identifier_and_kind_filters() {
        let repo = repo();
        let criteria = FilterCriteria::new()
            .with_identifier(r"^e-21-")
            .unwrap()
            .with_kinds(vec![RecordKind::Expense]);
        let selection = select(&repo, &criteria);
        assert_eq!(identifiers(&selection.expenses), vec!["e-21-2", "e-21-1"]);
        assert!(selection.invoices.is_empty());
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_invalid_identifier_pattern_is_an_error() {
        assert!(FilterCriteria::new().with_identifier("(").is_err());
    }

    #[test]
    fn test_filter_year() {
        let filtered = filter_year(&repo(), 2021);
        assert_eq!(identifiers(&filtered.expenses), vec!["e-21-2", "e-21-1"]);
        assert!(filtered.statement.transactions.is_empty());
    }

    #[test]
    fn test_sort_by_date_puts_undated_first() {
        let mut selection = select(&repo(), &FilterCriteria::new());
        sort_by_date(&mut selection);
        assert_eq!(
            identifiers(&selection.expenses),
            vec!["e-x-1", "e-20-9", "e-21-1", "e-21-2"]
        );
    }

    #[test]
    fn test_record_kind_parsing() {
        assert_eq!("Invoices".parse::<RecordKind>().unwrap(), RecordKind::Invoice);
        assert!("budget".parse::<RecordKind>().is_err());
    }
}
