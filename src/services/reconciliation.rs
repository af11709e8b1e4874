//! Reconciliation service
//!
//! Links unlinked bank transactions to the documents named in their
//! descriptions and copies settlement Id and date back onto every document a
//! transaction refers to. Running it twice changes nothing the second time.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::events::{EngineEvent, EventSink};
use crate::models::{Document, DocumentId, JournalMode, PartyId, TransactionId};
use crate::storage::Repository;

use super::matcher::Matcher;

/// A transaction the matcher linked to a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPair {
    pub transaction: String,
    pub document: String,
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationSummary {
    /// Newly linked transactions
    pub matched: Vec<MatchedPair>,
    /// Identifiers of transactions still without a document
    pub unmatched: Vec<String>,
    /// Identifiers of transactions that already had a document
    pub skipped: Vec<String>,
    /// Documents whose settlement fields changed
    pub settlements_updated: usize,
}

struct Link {
    position: usize,
    document: DocumentId,
    party: Option<PartyId>,
}

/// Party implied by a document: the advancing employee, the obliged
/// customer of a billable expense or the invoiced customer
fn implied_party(doc: &Document<'_>) -> Option<PartyId> {
    let party = match doc {
        Document::Expense(e) if e.advanced_by_third_party => &e.advanced_third_party_id,
        Document::Expense(e) if e.billable => &e.obliged_customer_id,
        Document::Invoice(i) => &i.customer_id,
        _ => return None,
    };
    (!party.is_unset()).then(|| party.clone())
}

/// Service for the reconciliation pass
pub struct ReconciliationService<'s> {
    sink: &'s dyn EventSink,
}

impl<'s> ReconciliationService<'s> {
    pub fn new(sink: &'s dyn EventSink) -> Self {
        Self { sink }
    }

    /// Run the matcher and back-fill settlement fields
    pub fn reconcile(&self, mut repo: Repository) -> (Repository, ReconciliationSummary) {
        let mut summary = ReconciliationSummary::default();

        let links = self.find_links(&repo, &mut summary);
        for link in links {
            let trn = &mut repo.statement.transactions[link.position];
            trn.associated_document_id = link.document;
            trn.journal_mode = JournalMode::Auto;
            if let Some(party) = link.party {
                if trn.associated_party_id.is_unset() {
                    trn.associated_party_id = party;
                }
            }
        }

        summary.settlements_updated = self.repopulate_settlements(&mut repo);

        self.sink.emit(EngineEvent::info(format!(
            "reconciliation: {} matched, {} unmatched, {} already linked, {} settlements updated",
            summary.matched.len(),
            summary.unmatched.len(),
            summary.skipped.len(),
            summary.settlements_updated
        )));
        (repo, summary)
    }

    fn find_links(&self, repo: &Repository, summary: &mut ReconciliationSummary) -> Vec<Link> {
        let matcher = Matcher::new(repo);
        let mut links = Vec::new();

        for (position, trn) in repo.statement.transactions.iter().enumerate() {
            if trn.has_document() {
                summary.skipped.push(trn.identifier.clone());
                continue;
            }
            match matcher.document_for(trn) {
                Some(doc) => {
                    self.sink.emit(EngineEvent::MatchFound {
                        transaction: trn.identifier.clone(),
                        document: doc.identifier().to_string(),
                    });
                    summary.matched.push(MatchedPair {
                        transaction: trn.identifier.clone(),
                        document: doc.identifier().to_string(),
                    });
                    links.push(Link {
                        position,
                        document: doc.id(),
                        party: implied_party(&doc),
                    });
                }
                None => summary.unmatched.push(trn.identifier.clone()),
            }
        }
        links
    }

    /// Copy Id and date of each settling transaction onto its document.
    ///
    /// The first transaction referencing a document wins. Returns the number
    /// of documents that changed.
    fn repopulate_settlements(&self, repo: &mut Repository) -> usize {
        let settlements: Vec<(DocumentId, TransactionId, Option<NaiveDate>, String)> = repo
            .statement
            .transactions
            .iter()
            .filter(|t| t.has_document())
            .map(|t| {
                (
                    t.associated_document_id.clone(),
                    t.id.clone(),
                    t.date,
                    t.identifier.clone(),
                )
            })
            .collect();

        let expenses = positions(repo.expenses.iter().map(|e| e.id.as_str()));
        let invoices = positions(repo.invoices.iter().map(|i| i.id.as_str()));
        let misc = positions(repo.misc.iter().map(|m| m.id.as_str()));

        let mut settled = HashSet::new();
        let mut updated = 0;
        for (doc_id, trn_id, date, trn_identifier) in settlements {
            if !settled.insert(doc_id.clone()) {
                self.sink.emit(EngineEvent::warning(format!(
                    "{} references document {} which is already settled by another transaction",
                    trn_identifier, doc_id
                )));
                continue;
            }
            let key = doc_id.as_str();
            let fields = if let Some(&i) = expenses.get(key) {
                let e = &mut repo.expenses[i];
                (&mut e.settlement_transaction_id, &mut e.date_of_settlement)
            } else if let Some(&i) = invoices.get(key) {
                let inv = &mut repo.invoices[i];
                (&mut inv.settlement_transaction_id, &mut inv.date_of_settlement)
            } else if let Some(&i) = misc.get(key) {
                let m = &mut repo.misc[i];
                (&mut m.settlement_transaction_id, &mut m.date_of_settlement)
            } else {
                // Dangling, reported by validation
                continue;
            };
            let (settlement_id, settlement_date) = fields;
            if *settlement_id != trn_id || *settlement_date != date {
                *settlement_id = trn_id;
                *settlement_date = date;
                updated += 1;
            }
        }
        updated
    }
}

fn positions<'a>(ids: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (position, id) in ids.enumerate() {
        map.entry(id.to_string()).or_insert(position);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::events::{MemorySink, NullSink};
    use crate::models::{
        Expense, Invoice, MiscRecord, Money, Party, PartyKind, Transaction, TransactionKind,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn repo() -> Repository {
        let mut repo = Repository::default();
        let kai = Party::new(PartyKind::Employee, "p-01", "Kai");
        let acme = Party::new(PartyKind::Customer, "c-1", "ACME");

        let mut exp = Expense::new("e-21-3", "Cables", Money::chf(12000));
        exp.advanced_by_third_party = true;
        exp.advanced_third_party_id = kai.id.clone();

        let mut inv = Invoice::new("i-21-1", "Web Site", Money::chf(200000));
        inv.customer_id = acme.id.clone();

        let mut refund = Transaction::new("t-21-7", TransactionKind::Debit, date(2021, 3, 20), Money::chf(12000));
        refund.description = "Refund e-21-3".into();
        let mut payment = Transaction::new("t-21-8", TransactionKind::Credit, date(2021, 4, 30), Money::chf(200000));
        payment.description = "Payment i-21-1".into();
        let mut random = Transaction::new("t-21-9", TransactionKind::Credit, date(2021, 5, 1), Money::chf(4200));
        random.description = "random refund".into();

        repo.employees.push(kai);
        repo.customers.push(acme);
        repo.expenses.push(exp);
        repo.invoices.push(inv);
        repo.statement.transactions = vec![refund, payment, random];
        repo
    }

    #[test]
    fn test_links_and_back_fills() {
        let sink = MemorySink::new();
        let (repo, summary) = ReconciliationService::new(&sink).reconcile(repo());

        assert_eq!(summary.matched.len(), 2);
        assert_eq!(summary.unmatched, vec!["t-21-9".to_string()]);
        assert_eq!(summary.settlements_updated, 2);

        let refund = &repo.statement.transactions[0];
        assert_eq!(refund.associated_document_id, DocumentId::from(&repo.expenses[0].id));
        assert_eq!(refund.associated_party_id, repo.employees[0].id);
        assert_eq!(refund.journal_mode, JournalMode::Auto);

        assert_eq!(repo.expenses[0].settlement_transaction_id, refund.id);
        assert_eq!(repo.expenses[0].date_of_settlement, Some(date(2021, 3, 20)));

        let payment = &repo.statement.transactions[1];
        assert_eq!(payment.associated_party_id, repo.customers[0].id);
        assert_eq!(repo.invoices[0].date_of_settlement, Some(date(2021, 4, 30)));

        let matches = sink
            .events()
            .into_iter()
            .filter(|e| matches!(e, EngineEvent::MatchFound { .. }))
            .count();
        assert_eq!(matches, 2);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let service = ReconciliationService::new(&NullSink);
        let (once, _) = service.reconcile(repo());
        let (twice, summary) = service.reconcile(once.clone());
        assert_eq!(once, twice);
        assert_eq!(summary.settlements_updated, 0);
        assert!(summary.matched.is_empty());
        assert_eq!(summary.skipped.len(), 2);
    }

    #[test]
    fn test_existing_party_is_kept() {
        let mut input = repo();
        input.statement.transactions[0].associated_party_id = PartyId::new("someone");
        let (repo, _) = ReconciliationService::new(&NullSink).reconcile(input);
        assert_eq!(
            repo.statement.transactions[0].associated_party_id,
            PartyId::new("someone")
        );
    }

    #[test]
    fn test_manual_links_repopulate_misc_records() {
        let mut input = repo();
        let misc = MiscRecord::new("m-21-1", "Tax refund");
        input.statement.transactions[2].associated_document_id = DocumentId::from(&misc.id);
        input.misc.push(misc);

        let (repo, summary) = ReconciliationService::new(&NullSink).reconcile(input);
        assert_eq!(summary.skipped, vec!["t-21-9".to_string()]);
        assert_eq!(repo.misc[0].settlement_transaction_id, repo.statement.transactions[2].id);
        assert_eq!(repo.misc[0].date_of_settlement, Some(date(2021, 5, 1)));
        assert_eq!(repo.statement.transactions[2].journal_mode, JournalMode::Manual);
    }
}
