//! Settlement entries for bank transactions

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::events::EngineEvent;
use crate::models::{Document, Expense, Invoice, Party, Transaction};

use super::entry::{Comment, Entry, EntryStatus, DEFAULT_ACCOUNT};
use super::template::TemplateData;
use super::{Context, NO_EMPLOYEE};

pub(super) fn transaction_entries(ctx: &Context<'_>, trn: &Transaction) -> Vec<Entry> {
    if !trn.has_document() {
        return vec![default_entry(ctx, trn, None)];
    }
    let entry = match ctx.index.document(&trn.associated_document_id) {
        Some(Document::Expense(exp)) if exp.advanced_by_third_party => {
            if trn.is_debit() {
                advanced_expense_settlement(ctx, trn, exp)
            } else {
                let reason = format!(
                    "{} was advanced by an employee but is settled by a credit",
                    exp
                );
                default_entry(ctx, trn, Some(reason))
            }
        }
        Some(Document::Expense(exp)) => company_paid_expense_settlement(ctx, trn, exp),
        Some(Document::Invoice(inv)) => invoice_settlement(ctx, trn, inv),
        Some(Document::Misc(_)) => default_entry(ctx, trn, None),
        None => {
            let reason = format!(
                "no expense/invoice/misc record for id \"{}\" found",
                trn.associated_document_id
            );
            default_entry(ctx, trn, Some(reason))
        }
    };
    vec![entry]
}

/// Notes a difference between the transaction and the settled amount
fn compare_amounts(ctx: &Context<'_>, trn: &Transaction, doc: Document<'_>, cmt: &mut Comment) {
    let Some(expected) = doc.amount() else {
        return;
    };
    match trn.amount.checked_cmp(&expected) {
        Ok(Ordering::Equal) => {}
        Ok(_) => {
            cmt.add(format!(
                "the two involved amounts don't match: {} vs {}",
                trn.amount, expected
            ));
            ctx.sink.emit(EngineEvent::AmountMismatch {
                transaction: trn.identifier.clone(),
                document: doc.identifier().to_string(),
                expected: expected.to_string(),
                actual: trn.amount.to_string(),
            });
        }
        Err(err) => cmt.add(format!("{} settling {}: {}", trn.identifier, doc.identifier(), err)),
    }
}

/// Common prelude of every settlement: date, currency and amount checks
fn settlement_comment(
    ctx: &Context<'_>,
    mode: &str,
    trn: &Transaction,
    doc: Option<Document<'_>>,
) -> (Comment, NaiveDate) {
    let mut cmt = Comment::new(mode, trn.to_string());
    let date = ctx.date(trn.date, "transaction date", &mut cmt);
    ctx.check_currency(trn.amount, &mut cmt);
    if let Some(doc) = doc {
        compare_amounts(ctx, trn, doc, &mut cmt);
    }
    (cmt, date)
}

fn advanced_expense_settlement(ctx: &Context<'_>, trn: &Transaction, exp: &Expense) -> Entry {
    let (mut cmt, date) = settlement_comment(
        ctx,
        "settlement of employee advancement",
        trn,
        Some(Document::Expense(exp)),
    );

    let employee = ctx.employee(&exp.advanced_third_party_id, &mut cmt);
    let account1 = employee
        .map(|emp| ctx.config.employee_account(&emp.name))
        .unwrap_or_else(|| NO_EMPLOYEE.to_string());

    let data = TemplateData::new()
        .with("Identifier", &exp.identifier)
        .with("Name", &exp.name)
        .with_opt("Party", employee.map(Party::short_label));
    let description = ctx.describe(
        "advanced expense settlement description",
        &ctx.config.advanced_expense_settlement_description,
        &data,
        &mut cmt,
    );

    Entry {
        date,
        status: EntryStatus::Unmarked,
        description,
        comment: cmt,
        account1,
        account2: ctx.config.bank_account.clone(),
        amount: trn.amount,
    }
}

fn company_paid_expense_settlement(ctx: &Context<'_>, trn: &Transaction, exp: &Expense) -> Entry {
    let (mut cmt, date) = settlement_comment(
        ctx,
        "settlement of company paid expense",
        trn,
        Some(Document::Expense(exp)),
    );

    let data = TemplateData::new()
        .with("Identifier", &exp.identifier)
        .with("Name", &exp.name);
    let description = ctx.describe(
        "company paid expense settlement description",
        &ctx.config.company_paid_expense_settlement_description,
        &data,
        &mut cmt,
    );

    Entry {
        date,
        status: EntryStatus::Unmarked,
        description,
        comment: cmt,
        account1: ctx.config.payable_account.clone(),
        account2: ctx.config.bank_account.clone(),
        amount: trn.amount,
    }
}

fn invoice_settlement(ctx: &Context<'_>, trn: &Transaction, inv: &Invoice) -> Entry {
    let (mut cmt, date) =
        settlement_comment(ctx, "invoice settlement", trn, Some(Document::Invoice(inv)));
    if inv.revoked {
        cmt.add(format!("{} is revoked", inv));
    }

    let customer = ctx.customer(&inv.customer_id, &mut cmt);
    let data = TemplateData::new()
        .with("Identifier", &inv.identifier)
        .with("Name", &inv.name)
        .with_opt("Party", customer.map(Party::short_label));
    let description = ctx.describe(
        "invoice settlement description",
        &ctx.config.invoice_settlement_description,
        &data,
        &mut cmt,
    );

    Entry {
        date,
        status: EntryStatus::Unmarked,
        description,
        comment: cmt,
        account1: ctx.config.bank_account.clone(),
        account2: ctx.config.receivable_account.clone(),
        amount: trn.amount,
    }
}

/// Books the transaction against [`DEFAULT_ACCOUNT`] and leaves the rest to
/// the user
fn default_entry(ctx: &Context<'_>, trn: &Transaction, reason: Option<String>) -> Entry {
    let (mut cmt, date) = settlement_comment(ctx, "default", trn, None);
    cmt.manual = true;
    if let Some(reason) = reason {
        cmt.add(reason);
    }

    let data = TemplateData::new()
        .with("Identifier", &trn.identifier)
        .with("Name", &trn.description);
    let description = ctx.describe(
        "default transaction description",
        &ctx.config.default_transaction_description,
        &data,
        &mut cmt,
    );

    let bank = ctx.config.bank_account.clone();
    let (account1, account2) = if trn.is_credit() {
        (bank, DEFAULT_ACCOUNT.to_string())
    } else {
        (DEFAULT_ACCOUNT.to_string(), bank)
    };

    Entry {
        date,
        status: EntryStatus::Unmarked,
        description,
        comment: cmt,
        account1,
        account2,
        amount: trn.amount,
    }
}
