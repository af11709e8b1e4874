//! Journal engine
//!
//! Turns a repository into an ordered list of two-legged entries and renders
//! them as an hledger journal. Entries come in two phases:
//!
//! - occurrence entries, one per expense and non-revoked invoice, dated when
//!   the document accrued or was sent
//! - settlement entries, one per bank transaction, dated when money moved
//!
//! Building never fails. Whatever cannot be derived ends up in the entry's
//! comment as a `TODO:` so the journal stays usable.

pub mod entry;
mod occurrence;
mod render;
mod settlement;
pub mod template;

pub use entry::{Comment, Entry, EntryStatus, DEFAULT_ACCOUNT};
pub use template::{TemplateData, MISSING_VALUE};

use chrono::{Datelike, NaiveDate};

use crate::events::{EngineEvent, EventSink};
use crate::models::{AccountAlias, Currency, JournalConfig, Money, Party, PartyId};
use crate::storage::{Repository, RepositoryIndex};

/// An ordered hledger journal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Journal {
    pub aliases: Vec<AccountAlias>,
    pub entries: Vec<Entry>,
}

impl Journal {
    /// Derive every entry of the repository, sorted by date. Entries of the
    /// same date keep their derivation order.
    pub fn from_repository(repo: &Repository, sink: &dyn EventSink) -> Self {
        let ctx = Context::new(repo, sink);
        let mut entries = Vec::new();

        for exp in &repo.expenses {
            entries.extend(occurrence::expense_entries(&ctx, exp));
        }
        for inv in &repo.invoices {
            entries.extend(occurrence::invoice_entries(&ctx, inv));
        }
        for trn in repo.transactions() {
            entries.extend(settlement::transaction_entries(&ctx, trn));
        }
        entries.sort_by_key(|e| e.date);

        for entry in entries.iter().filter(|e| e.comment.manual) {
            sink.emit(EngineEvent::ManualCorrection {
                element: entry.comment.element.clone(),
            });
        }

        Self {
            aliases: repo.journal_config().account_aliases.clone(),
            entries,
        }
    }

    /// Drop every entry not dated in `year`
    pub fn retain_year(&mut self, year: i32) {
        self.entries.retain(|e| e.date.year() == year);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose comment renders as `TODO:`
    pub fn todo_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.comment.needs_attention())
            .count()
    }
}

/// Placeholder account when the expense category cannot be resolved
pub(crate) const NO_ACCOUNT: &str = "no account found";
/// Placeholder account when the advancing employee cannot be resolved
pub(crate) const NO_EMPLOYEE: &str = "no employee found";

/// Lookups shared by both phases
pub(crate) struct Context<'a> {
    pub index: RepositoryIndex<'a>,
    pub config: &'a JournalConfig,
    pub currency: Currency,
    pub sink: &'a dyn EventSink,
}

impl<'a> Context<'a> {
    fn new(repo: &'a Repository, sink: &'a dyn EventSink) -> Self {
        Self {
            index: repo.index(),
            config: repo.journal_config(),
            currency: repo.currency(),
            sink,
        }
    }

    /// The date of an entry; undated records land on 1970-01-01
    pub fn date(&self, date: Option<NaiveDate>, what: &str, cmt: &mut Comment) -> NaiveDate {
        match date {
            Some(date) => date,
            None => {
                cmt.add(format!("no {} set", what));
                NaiveDate::default()
            }
        }
    }

    pub fn check_currency(&self, amount: Money, cmt: &mut Comment) {
        if amount.currency() != self.currency {
            cmt.add(format!(
                "amount {} is not in the repository currency {}",
                amount, self.currency
            ));
        }
    }

    pub fn employee(&self, id: &PartyId, cmt: &mut Comment) -> Option<&'a Party> {
        if id.is_unset() {
            cmt.add("no advancing employee set");
            return None;
        }
        let employee = self.index.employee(id);
        if employee.is_none() {
            cmt.add(format!("no employee for id \"{}\" found", id));
        }
        employee
    }

    /// Set customers must resolve; unset ones surface through the template
    pub fn customer(&self, id: &PartyId, cmt: &mut Comment) -> Option<&'a Party> {
        if id.is_unset() {
            return None;
        }
        let customer = self.index.customer(id);
        if customer.is_none() {
            cmt.add(format!("no customer for id \"{}\" found", id));
        }
        customer
    }

    pub fn describe(
        &self,
        name: &str,
        template: &str,
        data: &TemplateData,
        cmt: &mut Comment,
    ) -> String {
        let (text, errors) = template::apply(name, template, data);
        cmt.extend(errors);
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::events::{MemorySink, NullSink};
    use crate::models::{
        Expense, ExpenseCategory, Invoice, MiscRecord, PartyKind, Project, Transaction,
        TransactionKind,
    };
    use crate::services::ReconciliationService;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn base() -> Repository {
        let mut repo = Repository::default();
        repo.config
            .journal_config
            .expense_categories
            .push(ExpenseCategory::new("Materials", "expenses:ops:materials"));
        repo.employees
            .push(Party::new(PartyKind::Employee, "p-01", "Kai"));
        repo.customers
            .push(Party::new(PartyKind::Customer, "c-1", "ACME"));
        repo
    }

    fn advanced_expense(repo: &Repository) -> Expense {
        let mut exp = Expense::new("e-21-3", "Cables", Money::chf(12000));
        exp.date_of_accrual = Some(date(2021, 3, 4));
        exp.advanced_by_third_party = true;
        exp.advanced_third_party_id = repo.employees[0].id.clone();
        exp.expense_category = "Materials".into();
        exp.internal = true;
        exp
    }

    fn transaction(identifier: &str, kind: TransactionKind, day: NaiveDate, minor: i64) -> Transaction {
        Transaction::new(identifier, kind, day, Money::chf(minor))
    }

    fn lines(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn test_advanced_expense_settled() {
        let mut repo = base();
        repo.expenses.push(advanced_expense(&repo));
        let mut refund = transaction("t-21-7", TransactionKind::Debit, date(2021, 3, 20), 12000);
        refund.description = "Refund e-21-3".into();
        repo.statement.transactions.push(refund);

        let (repo, _) = ReconciliationService::new(&NullSink).reconcile(repo);
        let journal = Journal::from_repository(&repo, &NullSink);
        assert_eq!(journal.len(), 2);

        let occurrence = &journal.entries[0];
        assert_eq!(occurrence.date, date(2021, 3, 4));
        assert_eq!(occurrence.account1, "expenses:ops:materials");
        assert_eq!(occurrence.account2, "liabilities:employees:Kai");
        assert_eq!(
            occurrence.description,
            "Payment of expense e-21-3 by Kai (p-01) with private funds"
        );

        let settlement = &journal.entries[1];
        assert_eq!(settlement.date, date(2021, 3, 20));
        assert_eq!(settlement.account1, "liabilities:employees:Kai");
        assert_eq!(settlement.account2, "assets:bank");
        assert_eq!(settlement.amount, Money::chf(12000));

        let text = journal.render();
        let rendered = lines(&text);
        assert!(rendered[0].ends_with("; parsed as employee advanced expense"));
        assert!(rendered[1].trim_start().starts_with("expenses:ops:materials"));
        assert!(rendered[1].ends_with(" CHF120"));
        assert!(rendered[2].ends_with(" -CHF120"));
        assert_eq!(rendered[3], "");
        assert!(rendered[4].starts_with("2021-03-20 Refund of Kai (p-01) for e-21-3 ;"));
        assert!(rendered[4].ends_with("; parsed as settlement of employee advancement"));
        assert!(rendered[6].trim_start().starts_with("assets:bank"));
    }

    #[test]
    fn test_unmatched_credit_needs_manual_correction() {
        let mut repo = base();
        let mut trn = transaction("t-21-9", TransactionKind::Credit, date(2021, 5, 1), 4200);
        trn.description = "random refund".into();
        repo.statement.transactions.push(trn);

        let sink = MemorySink::new();
        let journal = Journal::from_repository(&repo, &sink);
        assert_eq!(journal.len(), 1);

        let entry = &journal.entries[0];
        assert_eq!(entry.account1, "assets:bank");
        assert_eq!(entry.account2, DEFAULT_ACCOUNT);
        assert_eq!(entry.amount, Money::chf(4200));
        assert_eq!(entry.comment.to_string(), "TODO: manual correction needed");
        assert!(sink
            .events()
            .contains(&EngineEvent::ManualCorrection {
                element: "t-21-9: received 42.00 CHF at 2021-05-01".into()
            }));
    }

    #[test]
    fn test_unmatched_debit_books_against_unknown() {
        let mut repo = base();
        repo.statement
            .transactions
            .push(transaction("t-1", TransactionKind::Debit, date(2021, 5, 1), 100));
        let journal = Journal::from_repository(&repo, &NullSink);
        assert_eq!(journal.entries[0].account1, DEFAULT_ACCOUNT);
        assert_eq!(journal.entries[0].account2, "assets:bank");
    }

    #[test]
    fn test_revoked_invoice_still_resolves_as_settlement_target() {
        let mut repo = base();
        let mut inv = Invoice::new("i-21-1", "Web Site", Money::chf(200000));
        inv.customer_id = repo.customers[0].id.clone();
        inv.send_date = Some(date(2021, 4, 1));
        inv.revoked = true;
        let mut payment = transaction("t-21-8", TransactionKind::Credit, date(2021, 4, 30), 150000);
        payment.associated_document_id = (&inv.id).into();
        repo.invoices.push(inv);
        repo.statement.transactions.push(payment);

        let sink = MemorySink::new();
        let journal = Journal::from_repository(&repo, &sink);
        assert_eq!(journal.len(), 1);

        let entry = &journal.entries[0];
        assert_eq!(entry.account1, "assets:bank");
        assert_eq!(entry.account2, "assets:receivables");
        assert_eq!(entry.amount, Money::chf(150000));
        let comment = entry.comment.to_string();
        assert!(comment.contains("the two involved amounts don't match: 1500.00 CHF vs 2000.00 CHF"));
        assert!(comment.contains("invoice Web Site (i-21-1) is revoked"));
        assert!(sink
            .events()
            .iter()
            .any(|e| matches!(e, EngineEvent::AmountMismatch { .. })));
    }

    #[test]
    fn test_unknown_category_still_emits_entry() {
        let mut repo = base();
        let mut exp = advanced_expense(&repo);
        exp.expense_category = "Unknown".into();
        repo.expenses.push(exp);

        let journal = Journal::from_repository(&repo, &NullSink);
        let entry = &journal.entries[0];
        assert_eq!(entry.account1, NO_ACCOUNT);
        assert_eq!(
            entry.comment.to_string(),
            "TODO: no expense category for name \"Unknown\" found"
        );
    }

    #[test]
    fn test_missing_employee_uses_placeholder() {
        let mut repo = base();
        let mut exp = advanced_expense(&repo);
        exp.advanced_third_party_id = PartyId::new("gone");
        repo.expenses.push(exp);

        let entry = &Journal::from_repository(&repo, &NullSink).entries[0];
        assert_eq!(entry.account2, NO_EMPLOYEE);
        assert!(entry.description.contains(MISSING_VALUE));
        assert!(entry
            .comment
            .errors
            .contains(&"no employee for id \"gone\" found".to_string()));
    }

    #[test]
    fn test_company_paid_expense_occurrence_and_settlement() {
        let mut repo = base();
        let project = Project::new("p-1", "Web Site", repo.customers[0].id.clone());
        let mut exp = Expense::new("e-21-4", "Hosting", Money::chf(5000));
        exp.date_of_accrual = Some(date(2021, 2, 1));
        exp.expense_category = "Materials".into();
        exp.project_id = project.id.clone();
        let mut payment = transaction("t-21-2", TransactionKind::Debit, date(2021, 2, 10), 5000);
        payment.associated_document_id = (&exp.id).into();
        repo.projects.push(project);
        repo.expenses.push(exp);
        repo.statement.transactions.push(payment);

        let journal = Journal::from_repository(&repo, &NullSink);
        let occurrence = &journal.entries[0];
        assert_eq!(occurrence.account2, "liabilities:payables");
        assert_eq!(
            occurrence.description,
            "Purchase of Hosting (e-21-4) for project Web Site"
        );
        assert_eq!(occurrence.comment.to_string(), "TODO: manual correction needed");

        let settlement = &journal.entries[1];
        assert_eq!(settlement.account1, "liabilities:payables");
        assert_eq!(settlement.account2, "assets:bank");
        assert_eq!(settlement.comment.to_string(), "parsed as settlement of company paid expense");
    }

    #[test]
    fn test_debit_paid_expense_books_bank() {
        let mut repo = base();
        let mut exp = Expense::new("e-21-5", "Paper", Money::chf(900));
        exp.date_of_accrual = Some(date(2021, 2, 1));
        exp.expense_category = "Materials".into();
        exp.internal = true;
        exp.paid_with_debit = true;
        repo.expenses.push(exp);

        let entry = &Journal::from_repository(&repo, &NullSink).entries[0];
        assert_eq!(entry.account2, "assets:bank");
        assert_eq!(entry.description, "Expense for Paper (e-21-5)");
    }

    #[test]
    fn test_advanced_expense_settled_by_credit_falls_back() {
        let mut repo = base();
        let exp = advanced_expense(&repo);
        let mut trn = transaction("t-3", TransactionKind::Credit, date(2021, 4, 1), 12000);
        trn.associated_document_id = (&exp.id).into();
        repo.expenses.push(exp);
        repo.statement.transactions.push(trn);

        let journal = Journal::from_repository(&repo, &NullSink);
        let entry = &journal.entries[1];
        assert_eq!(entry.account1, "assets:bank");
        assert_eq!(entry.account2, DEFAULT_ACCOUNT);
        assert!(entry.comment.to_string().starts_with("TODO: expense Cables (e-21-3)"));
    }

    #[test]
    fn test_misc_and_dangling_documents_fall_back_to_default() {
        let mut repo = base();
        let misc = MiscRecord::new("m-1", "Fee notice");
        let mut fee = transaction("t-1", TransactionKind::Debit, date(2021, 1, 5), 300);
        fee.associated_document_id = (&misc.id).into();
        let mut lost = transaction("t-2", TransactionKind::Debit, date(2021, 1, 6), 300);
        lost.associated_document_id = crate::models::DocumentId::new("nowhere");
        repo.misc.push(misc);
        repo.statement.transactions = vec![fee, lost];

        let journal = Journal::from_repository(&repo, &NullSink);
        assert_eq!(journal.len(), 2);
        assert_eq!(journal.entries[0].comment.to_string(), "TODO: manual correction needed");
        assert_eq!(
            journal.entries[1].comment.to_string(),
            "TODO: no expense/invoice/misc record for id \"nowhere\" found"
        );
    }

    #[test]
    fn test_invoice_occurrence() {
        let mut repo = base();
        let mut inv = Invoice::new("i-21-1", "Web Site", Money::chf(200000));
        inv.customer_id = repo.customers[0].id.clone();
        inv.send_date = Some(date(2021, 4, 1));
        repo.invoices.push(inv);

        let entry = &Journal::from_repository(&repo, &NullSink).entries[0];
        assert_eq!(entry.account1, "assets:receivables");
        assert_eq!(entry.account2, "revenues:services");
        assert_eq!(entry.description, "Invoice i-21-1 to ACME (c-1)");
        assert_eq!(entry.comment.to_string(), "parsed as invoice sent");
    }

    #[test]
    fn test_undated_document_is_flagged() {
        let mut repo = base();
        let mut exp = advanced_expense(&repo);
        exp.date_of_accrual = None;
        repo.expenses.push(exp);

        let entry = &Journal::from_repository(&repo, &NullSink).entries[0];
        assert_eq!(entry.date, NaiveDate::default());
        assert_eq!(entry.comment.to_string(), "TODO: no accrual date set");
    }

    #[test]
    fn test_foreign_currency_is_flagged() {
        let mut repo = base();
        let mut exp = advanced_expense(&repo);
        exp.amount = Money::from_minor(12000, Currency::parse("EUR").unwrap());
        repo.expenses.push(exp);

        let entry = &Journal::from_repository(&repo, &NullSink).entries[0];
        assert!(entry.comment.errors[0].contains("repository currency CHF"));
    }

    #[test]
    fn test_entries_sorted_stably_and_balanced() {
        let mut repo = base();
        for (identifier, day) in [("t-1", 9), ("t-2", 3), ("t-3", 9), ("t-4", 1)] {
            repo.statement
                .transactions
                .push(transaction(identifier, TransactionKind::Credit, date(2021, 1, day), 100));
        }
        let journal = Journal::from_repository(&repo, &NullSink);
        let order: Vec<&str> = journal
            .entries
            .iter()
            .map(|e| e.comment.element.split(':').next().unwrap())
            .collect();
        assert_eq!(order, vec!["t-4", "t-2", "t-1", "t-3"]);
        assert!(journal.entries.windows(2).all(|w| w[0].date <= w[1].date));

        let text = journal.render();
        let postings: Vec<&str> = text.lines().filter(|l| l.starts_with("    ")).collect();
        assert_eq!(postings.len(), 2 * journal.len());
        for pair in postings.chunks(2) {
            let first = pair[0].rsplit(' ').next().unwrap();
            let second = pair[1].rsplit(' ').next().unwrap();
            assert_eq!(format!("-{}", first), second);
        }
    }

    #[test]
    fn test_retain_year_keeps_cross_year_settlements() {
        let mut repo = base();
        let mut exp = advanced_expense(&repo);
        exp.date_of_accrual = Some(date(2020, 12, 20));
        let mut refund = transaction("t-21-1", TransactionKind::Debit, date(2021, 1, 4), 12000);
        refund.associated_document_id = (&exp.id).into();
        repo.expenses.push(exp);
        repo.statement.transactions.push(refund);

        let mut journal = Journal::from_repository(&repo, &NullSink);
        journal.retain_year(2021);
        assert_eq!(journal.len(), 1);
        assert_eq!(journal.entries[0].account1, "liabilities:employees:Kai");
        assert_eq!(journal.todo_count(), 0);
    }
}
