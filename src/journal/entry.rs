//! Journal entries and their comments

use chrono::NaiveDate;
use std::fmt;

use crate::models::Money;

/// Account used when the counter side of a posting is not known
pub const DEFAULT_ACCOUNT: &str = "other:unknown";

/// Clearing state of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryStatus {
    #[default]
    Unmarked,
    Pending,
    Cleared,
}

impl EntryStatus {
    /// The mark written between date and description
    pub fn mark(&self) -> &'static str {
        match self {
            Self::Unmarked => "",
            Self::Pending => "!",
            Self::Cleared => "*",
        }
    }
}

/// Structured entry comment
///
/// Keeps the derivation mode, the string form of the record the entry was
/// derived from and every problem met on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub mode: String,
    pub element: String,
    pub errors: Vec<String>,
    pub manual: bool,
}

impl Comment {
    pub fn new(mode: impl Into<String>, element: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            element: element.into(),
            errors: Vec::new(),
            manual: false,
        }
    }

    /// A comment for an entry that has to be finished by hand
    pub fn manual(mode: impl Into<String>, element: impl Into<String>) -> Self {
        Self {
            manual: true,
            ..Self::new(mode, element)
        }
    }

    pub fn add(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = String>) {
        self.errors.extend(errors);
    }

    /// Whether the rendered comment starts with `TODO:`
    pub fn needs_attention(&self) -> bool {
        self.manual || !self.errors.is_empty()
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.errors.is_empty() {
            write!(f, "TODO: {}", self.errors.join(", "))
        } else if self.manual {
            write!(f, "TODO: manual correction needed")
        } else {
            write!(f, "parsed as {}", self.mode)
        }
    }
}

/// One two-legged journal transaction
///
/// `account1` is debited and `account2` credited with `amount`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub date: NaiveDate,
    pub status: EntryStatus,
    pub description: String,
    pub comment: Comment,
    pub account1: String,
    pub account2: String,
    pub amount: Money,
}

impl Entry {
    /// The header line, `<date> [<mark> ]<description> ; <comment>`
    pub fn header(&self) -> String {
        let mark = self.status.mark();
        if mark.is_empty() {
            format!("{} {} ; {}", self.date.format("%Y-%m-%d"), self.description, self.comment)
        } else {
            format!(
                "{} {} {} ; {}",
                self.date.format("%Y-%m-%d"),
                mark,
                self.description,
                self.comment
            )
        }
    }

    /// Both posting lines. The currency codes of the two amounts line up
    /// eight columns after the longer account name.
    pub fn postings(&self) -> [String; 2] {
        let width = self
            .account1
            .chars()
            .count()
            .max(self.account2.chars().count())
            + 8;
        [
            posting(&self.account1, self.amount, width),
            posting(&self.account2, -self.amount, width),
        ]
    }

    /// Header and postings, without a trailing newline
    pub fn block(&self) -> String {
        let [first, second] = self.postings();
        format!("{}\n{}\n{}", self.header(), first, second)
    }
}

fn posting(account: &str, amount: Money, width: usize) -> String {
    let column = if amount.is_negative() { width - 1 } else { width };
    let pad = column.saturating_sub(account.chars().count());
    format!("    {}{}{}", account, " ".repeat(pad), amount.ledger_format())
}
