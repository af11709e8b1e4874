//! Occurrence entries for expenses and invoices

use crate::models::{Expense, Invoice, Party};

use super::entry::{Comment, Entry, EntryStatus};
use super::template::TemplateData;
use super::{Context, NO_ACCOUNT, NO_EMPLOYEE};

pub(super) fn expense_entries(ctx: &Context<'_>, exp: &Expense) -> Vec<Entry> {
    if exp.advanced_by_third_party {
        vec![employee_advanced_expense(ctx, exp)]
    } else {
        vec![company_paid_expense(ctx, exp)]
    }
}

/// Revoked invoices produce nothing
pub(super) fn invoice_entries(ctx: &Context<'_>, inv: &Invoice) -> Vec<Entry> {
    if inv.revoked {
        return Vec::new();
    }
    let mut cmt = Comment::new("invoice sent", inv.to_string());
    let date = ctx.date(inv.send_date, "send date", &mut cmt);
    ctx.check_currency(inv.amount, &mut cmt);

    let customer = ctx.customer(&inv.customer_id, &mut cmt);
    let data = TemplateData::new()
        .with("Identifier", &inv.identifier)
        .with("Name", &inv.name)
        .with_opt("Party", customer.map(Party::short_label));
    let description = ctx.describe(
        "invoicing description",
        &ctx.config.invoicing_description,
        &data,
        &mut cmt,
    );

    vec![Entry {
        date,
        status: EntryStatus::Unmarked,
        description,
        comment: cmt,
        account1: ctx.config.receivable_account.clone(),
        account2: ctx.config.revenue_account.clone(),
        amount: inv.amount,
    }]
}

fn category_account(ctx: &Context<'_>, exp: &Expense, cmt: &mut Comment) -> String {
    match ctx.config.category_by_name(&exp.expense_category) {
        Ok(category) => category.account.clone(),
        Err(err) => {
            cmt.add(err);
            NO_ACCOUNT.to_string()
        }
    }
}

fn employee_advanced_expense(ctx: &Context<'_>, exp: &Expense) -> Entry {
    let mut cmt = Comment::new("employee advanced expense", exp.to_string());
    let date = ctx.date(exp.date_of_accrual, "accrual date", &mut cmt);
    ctx.check_currency(exp.amount, &mut cmt);
    let account1 = category_account(ctx, exp, &mut cmt);

    let employee = ctx.employee(&exp.advanced_third_party_id, &mut cmt);
    let account2 = employee
        .map(|emp| ctx.config.employee_account(&emp.name))
        .unwrap_or_else(|| NO_EMPLOYEE.to_string());

    let data = TemplateData::new()
        .with("Identifier", &exp.identifier)
        .with("Name", &exp.name)
        .with_opt("Party", employee.map(Party::short_label));
    let description = ctx.describe(
        "expense advanced by employee description",
        &ctx.config.expense_advanced_by_employee_description,
        &data,
        &mut cmt,
    );

    Entry {
        date,
        status: EntryStatus::Unmarked,
        description,
        comment: cmt,
        account1,
        account2,
        amount: exp.amount,
    }
}

/// The credit side may later be refined by hand, hence the manual flag
fn company_paid_expense(ctx: &Context<'_>, exp: &Expense) -> Entry {
    let mut cmt = Comment::manual("company paid expense", exp.to_string());
    let date = ctx.date(exp.date_of_accrual, "accrual date", &mut cmt);
    ctx.check_currency(exp.amount, &mut cmt);
    let account1 = category_account(ctx, exp, &mut cmt);

    let description = if exp.internal {
        let data = TemplateData::new()
            .with("Identifier", &exp.identifier)
            .with("Name", &exp.name);
        ctx.describe(
            "internal expense occurrence description",
            &ctx.config.internal_expense_occurrence_description,
            &data,
            &mut cmt,
        )
    } else {
        let project = ctx.index.project(&exp.project_id);
        let data = TemplateData::new()
            .with("Identifier", &exp.identifier)
            .with("Name", &exp.name)
            .with_opt("Project", project.map(|p| p.name.as_str()));
        ctx.describe(
            "production expense occurrence description",
            &ctx.config.production_expense_occurrence_description,
            &data,
            &mut cmt,
        )
    };

    let account2 = if exp.paid_with_debit {
        ctx.config.bank_account.clone()
    } else {
        ctx.config.payable_account.clone()
    };

    Entry {
        date,
        status: EntryStatus::Unmarked,
        description,
        comment: cmt,
        account1,
        account2,
        amount: exp.amount,
    }
}
