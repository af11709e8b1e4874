//! Journal configuration
//!
//! Ledger accounts, description templates, account aliases and expense
//! categories used when translating records into journal entries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::validation::{Condition, Record};

/// Maps an expense category name to a ledger account
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub name: String,
    /// Colon separated ledger account, e.g. `expenses:operating:materials`
    pub account: String,
}

impl ExpenseCategory {
    pub fn new(name: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            account: account.into(),
        }
    }
}

/// An `alias <from> = <to>` line of the journal header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAlias {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalConfig {
    #[serde(default = "default_bank_account")]
    pub bank_account: String,

    #[serde(default = "default_receivable_account")]
    pub receivable_account: String,

    #[serde(default = "default_revenue_account")]
    pub revenue_account: String,

    #[serde(default = "default_payable_account")]
    pub payable_account: String,

    #[serde(default = "default_employee_liabilities_account")]
    pub employee_liabilities_account: String,

    #[serde(default = "default_invoicing_description")]
    pub invoicing_description: String,

    #[serde(default = "default_invoice_settlement_description")]
    pub invoice_settlement_description: String,

    #[serde(default = "default_expense_advanced_by_employee_description")]
    pub expense_advanced_by_employee_description: String,

    #[serde(default = "default_internal_expense_occurrence_description")]
    pub internal_expense_occurrence_description: String,

    #[serde(default = "default_production_expense_occurrence_description")]
    pub production_expense_occurrence_description: String,

    #[serde(default = "default_advanced_expense_settlement_description")]
    pub advanced_expense_settlement_description: String,

    #[serde(default = "default_company_paid_expense_settlement_description")]
    pub company_paid_expense_settlement_description: String,

    #[serde(default = "default_transaction_description")]
    pub default_transaction_description: String,

    #[serde(default)]
    pub account_aliases: Vec<AccountAlias>,

    #[serde(default)]
    pub expense_categories: Vec<ExpenseCategory>,
}

fn default_bank_account() -> String {
    "assets:bank".to_string()
}

fn default_receivable_account() -> String {
    "assets:receivables".to_string()
}

fn default_revenue_account() -> String {
    "revenues:services".to_string()
}

fn default_payable_account() -> String {
    "liabilities:payables".to_string()
}

fn default_employee_liabilities_account() -> String {
    "liabilities:employees".to_string()
}

fn default_invoicing_description() -> String {
    "Invoice {{Identifier}} to {{Party}}".to_string()
}

fn default_invoice_settlement_description() -> String {
    "Payment received for invoice {{Identifier}} from {{Party}}".to_string()
}

fn default_expense_advanced_by_employee_description() -> String {
    "Payment of expense {{Identifier}} by {{Party}} with private funds".to_string()
}

fn default_internal_expense_occurrence_description() -> String {
    "Expense for {{Name}} ({{Identifier}})".to_string()
}

fn default_production_expense_occurrence_description() -> String {
    "Purchase of {{Name}} ({{Identifier}}) for project {{Project}}".to_string()
}

fn default_advanced_expense_settlement_description() -> String {
    "Refund of {{Party}} for {{Identifier}}".to_string()
}

fn default_company_paid_expense_settlement_description() -> String {
    "Payment of expense {{Identifier}}".to_string()
}

fn default_transaction_description() -> String {
    "{{Name}} ({{Identifier}})".to_string()
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            bank_account: default_bank_account(),
            receivable_account: default_receivable_account(),
            revenue_account: default_revenue_account(),
            payable_account: default_payable_account(),
            employee_liabilities_account: default_employee_liabilities_account(),
            invoicing_description: default_invoicing_description(),
            invoice_settlement_description: default_invoice_settlement_description(),
            expense_advanced_by_employee_description:
                default_expense_advanced_by_employee_description(),
            internal_expense_occurrence_description: default_internal_expense_occurrence_description(),
            production_expense_occurrence_description:
                default_production_expense_occurrence_description(),
            advanced_expense_settlement_description: default_advanced_expense_settlement_description(),
            company_paid_expense_settlement_description:
                default_company_paid_expense_settlement_description(),
            default_transaction_description: default_transaction_description(),
            account_aliases: Vec::new(),
            expense_categories: Vec::new(),
        }
    }
}

impl JournalConfig {
    /// Look up an expense category by its name
    pub fn category_by_name(&self, name: &str) -> Result<&ExpenseCategory, String> {
        self.expense_categories
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| format!("no expense category for name \"{}\" found", name))
    }

    /// Employee liability sub-account for one employee
    pub fn employee_account(&self, employee_name: &str) -> String {
        format!("{}:{}", self.employee_liabilities_account, employee_name)
    }

    fn duplicate_conditions<'a, F>(&'a self, what: &str, key: F) -> Vec<Condition>
    where
        F: Fn(&'a ExpenseCategory) -> &'a str,
    {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for category in &self.expense_categories {
            *counts.entry(key(category)).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(value, count)| {
                Condition::fundamental(
                    true,
                    format!("expense category {} \"{}\" is used {} times", what, value, count),
                )
            })
            .collect()
    }
}

impl Record for JournalConfig {
    fn kind_name(&self) -> &'static str {
        "Journal-Config"
    }

    fn identifier(&self) -> &str {
        "journal config"
    }

    fn conditions(&self) -> Vec<Condition> {
        let mut conditions = vec![
            Condition::before_export(self.bank_account.is_empty(), "bank account is not set"),
            Condition::before_export(
                self.receivable_account.is_empty(),
                "receivable account is not set",
            ),
            Condition::before_export(self.revenue_account.is_empty(), "revenue account is not set"),
            Condition::before_export(self.payable_account.is_empty(), "payable account is not set"),
            Condition::before_export(
                self.employee_liabilities_account.is_empty(),
                "employee liabilities account is not set",
            ),
        ];
        for alias in &self.account_aliases {
            conditions.push(Condition::before_export(
                alias.from.trim().is_empty() || alias.to.trim().is_empty(),
                format!("account alias \"{} = {}\" is incomplete", alias.from, alias.to),
            ));
        }
        for category in &self.expense_categories {
            conditions.push(Condition::before_export(
                category.account.trim().is_empty(),
                format!("expense category \"{}\" has no account", category.name),
            ));
        }
        conditions.extend(self.duplicate_conditions("name", |c| c.name.as_str()));
        conditions.extend(self.duplicate_conditions("account", |c| c.account.as_str()));
        conditions
    }
}
