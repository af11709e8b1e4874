//! Expense model
//!
//! An expense is either paid by the company (with the debit card or later
//! through a payable) or advanced by an employee who is reimbursed afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ExpenseId, PartyId, ProjectId, TransactionId};
use super::money::Money;
use super::validation::{Condition, Record};

/// A business expense with its receipt
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Expense {
    #[serde(default)]
    pub id: ExpenseId,

    #[serde(default)]
    pub identifier: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub amount: Money,

    /// Attachment (receipt) path
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub date_of_accrual: Option<NaiveDate>,

    /// Whether the expense is passed on to a customer
    #[serde(default)]
    pub billable: bool,

    #[serde(default)]
    pub obliged_customer_id: PartyId,

    /// Whether an employee paid the expense out of their own pocket
    #[serde(default)]
    pub advanced_by_third_party: bool,

    #[serde(default)]
    pub advanced_third_party_id: PartyId,

    #[serde(default)]
    pub date_of_settlement: Option<NaiveDate>,

    #[serde(default)]
    pub settlement_transaction_id: TransactionId,

    /// Name of the expense category in the journal config
    #[serde(default)]
    pub expense_category: String,

    #[serde(default)]
    pub paid_with_debit: bool,

    #[serde(default)]
    pub internal: bool,

    #[serde(default)]
    pub project_id: ProjectId,
}

impl Expense {
    /// Create a new expense with a fresh Id
    pub fn new(identifier: impl Into<String>, name: impl Into<String>, amount: Money) -> Self {
        Self {
            id: ExpenseId::generate(),
            identifier: identifier.into(),
            name: name.into(),
            amount,
            ..Default::default()
        }
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expense {} ({})", self.name, self.identifier)
    }
}

impl Record for Expense {
    fn kind_name(&self) -> &'static str {
        "Expense"
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn conditions(&self) -> Vec<Condition> {
        vec![
            Condition::fundamental(self.id.is_unset(), "id is not set"),
            Condition::fundamental(self.identifier.trim().is_empty(), "identifier is not set"),
            Condition::before_export(self.name.trim().is_empty(), "name is not set"),
            Condition::before_export(
                !self.amount.is_positive(),
                format!("amount must be greater than zero (is {})", self.amount),
            ),
            Condition::before_export(self.date_of_accrual.is_none(), "accrual date is not set"),
            Condition::undefined(self.path.trim().is_empty(), "no attachment path set"),
            Condition::before_export(
                self.billable && self.obliged_customer_id.is_unset(),
                "expense is billable but no obliged customer is set",
            ),
            Condition::before_export(
                self.advanced_by_third_party && self.advanced_third_party_id.is_unset(),
                "expense was advanced by a third party but no employee is set",
            ),
            Condition::before_export(
                !self.internal && self.project_id.is_unset(),
                "expense is not internal but no project is set",
            ),
            Condition::before_export(
                self.expense_category.trim().is_empty(),
                "no expense category set",
            ),
            Condition::before_export(
                self.date_of_settlement.is_some() && self.settlement_transaction_id.is_unset(),
                "settlement date is set but no settlement transaction is referenced",
            ),
            Condition::before_export(
                self.date_of_settlement.is_none() && !self.settlement_transaction_id.is_unset(),
                "settlement transaction is referenced but no settlement date is set",
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::validation::FlawLevel;

    fn complete_expense() -> Expense {
        let mut exp = Expense::new("e-21-3", "Cables", Money::chf(12000));
        exp.date_of_accrual = NaiveDate::from_ymd_opt(2021, 3, 4);
        exp.path = "receipts/e-21-3.pdf".into();
        exp.expense_category = "Materials".into();
        exp.internal = true;
        exp
    }

    #[test]
    fn test_complete_expense_is_valid() {
        assert!(complete_expense().validate().is_valid());
    }

    #[test]
    fn test_zero_amount_fails() {
        let mut exp = complete_expense();
        exp.amount = Money::chf(0);
        let result = exp.validate();
        assert_eq!(result.flaws.len(), 1);
        assert_eq!(result.flaws[0].level, FlawLevel::BeforeExport);
        assert!(result.flaws[0].reason.contains("greater than zero"));
    }

    #[test]
    fn test_conditional_references() {
        let mut exp = complete_expense();
        exp.billable = true;
        exp.advanced_by_third_party = true;
        exp.internal = false;
        let reasons: Vec<_> = exp.validate().flaws.into_iter().map(|f| f.reason).collect();
        assert_eq!(reasons.len(), 3);
        assert!(reasons.iter().any(|r| r.contains("obliged customer")));
        assert!(reasons.iter().any(|r| r.contains("no employee")));
        assert!(reasons.iter().any(|r| r.contains("no project")));
    }

    #[test]
    fn test_settlement_pairing() {
        let mut exp = complete_expense();
        exp.date_of_settlement = NaiveDate::from_ymd_opt(2021, 3, 20);
        assert_eq!(exp.validate().flaws.len(), 1);

        exp.settlement_transaction_id = TransactionId::new("t1");
        assert!(exp.validate().is_valid());

        exp.date_of_settlement = None;
        assert_eq!(exp.validate().flaws.len(), 1);
    }

    #[test]
    fn test_missing_id_is_fundamental() {
        let mut exp = complete_expense();
        exp.id = ExpenseId::unset();
        let result = exp.validate();
        assert_eq!(result.flaws[0].level, FlawLevel::Fundamental);
    }

    #[test]
    fn test_display() {
        assert_eq!(complete_expense().to_string(), "expense Cables (e-21-3)");
    }
}
