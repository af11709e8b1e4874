//! Interactive completion of missing fields
//!
//! The engine never prompts on its own. Callers that have a user at hand pass
//! an [`Editor`]; without one every operation here is a no-op and the gaps
//! show up in the validation report instead.

use std::collections::VecDeque;

use chrono::NaiveDate;

use crate::models::ids::{EXPENSE_PREFIX, TRANSACTION_PREFIX};
use crate::models::{suggest_next_identifier, DocumentId, PartyId, ProjectId, Record};
use crate::storage::Repository;

use super::matcher::Matcher;

/// One choice offered for a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchItem {
    /// Shown to the user
    pub name: String,
    /// Stored when picked
    pub value: String,
    /// Matched against the user's search input
    pub search_text: String,
}

impl SearchItem {
    pub fn new(name: impl Into<String>, value: impl Into<String>, search_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            search_text: search_text.into(),
        }
    }
}

/// A request for one field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRequest {
    pub name: String,
    pub description: String,
    /// Suggested value, may be empty
    pub default: String,
    /// When non-empty the answer should be one of the item values
    pub items: Vec<SearchItem>,
}

impl FieldRequest {
    fn new(name: &str, description: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            description: description.into(),
            default: default.into(),
            items: Vec::new(),
        }
    }

    fn with_items(mut self, items: Vec<SearchItem>) -> Self {
        self.items = items;
        self
    }
}

/// Asks the user for field values
pub trait Editor {
    /// `None` or an empty answer leaves the field as it is
    fn ask(&mut self, request: &FieldRequest) -> Option<String>;
}

/// Answers requests from a fixed queue, for tests and scripted runs.
///
/// A `"-"` answer takes the request's default.
#[derive(Debug, Default)]
pub struct ScriptedEditor {
    answers: VecDeque<String>,
    asked: Vec<FieldRequest>,
}

impl ScriptedEditor {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Every request received so far
    pub fn asked(&self) -> &[FieldRequest] {
        &self.asked
    }
}

impl Editor for ScriptedEditor {
    fn ask(&mut self, request: &FieldRequest) -> Option<String> {
        self.asked.push(request.clone());
        let answer = self.answers.pop_front()?;
        if answer == "-" {
            Some(request.default.clone())
        } else {
            Some(answer)
        }
    }
}

/// Fills gaps in a repository through an optional [`Editor`]
pub struct CompletionService<'e> {
    editor: Option<&'e mut dyn Editor>,
}

impl<'e> CompletionService<'e> {
    pub fn new(editor: Option<&'e mut dyn Editor>) -> Self {
        Self { editor }
    }

    fn ask(&mut self, request: &FieldRequest) -> Option<String> {
        let answer = self.editor.as_mut()?.ask(request)?;
        let answer = answer.trim().to_string();
        (!answer.is_empty()).then_some(answer)
    }

    /// Ask for the identifier, party and document of one transaction.
    ///
    /// Returns the number of fields that changed.
    pub fn complete_transaction(&mut self, repo: &mut Repository, position: usize) -> usize {
        if self.editor.is_none() || position >= repo.statement.transactions.len() {
            return 0;
        }

        let (identifier_request, party_request, document_request) = {
            let matcher = Matcher::new(repo);
            let trn = &repo.statement.transactions[position];

            let identifier_request = trn.identifier.trim().is_empty().then(|| {
                FieldRequest::new(
                    "identifier",
                    format!("identifier of «{}»", trn),
                    suggest_next_identifier(repo.statement.identifiers(), TRANSACTION_PREFIX),
                )
            });

            let party_request = trn.associated_party_id.is_unset().then(|| {
                let default = matcher
                    .party_for(&trn.description)
                    .map(|p| p.id.to_string())
                    .unwrap_or_default();
                let items = repo
                    .customers
                    .iter()
                    .chain(&repo.employees)
                    .map(|p| {
                        SearchItem::new(
                            p.short_label(),
                            p.id.as_str(),
                            format!("{} {}", p.name, p.identifier),
                        )
                    })
                    .collect();
                FieldRequest::new(
                    "associated_party_id",
                    format!("party of «{}» ({})", trn, trn.description),
                    default,
                )
                .with_items(items)
            });

            let document_request = (!trn.has_document()).then(|| {
                let default = matcher
                    .document_for(trn)
                    .map(|d| d.id().to_string())
                    .unwrap_or_default();
                let index = matcher.index();
                let items = repo
                    .expenses
                    .iter()
                    .map(|e| (e.to_string(), DocumentId::from(&e.id), e.identifier.as_str()))
                    .chain(
                        repo.invoices
                            .iter()
                            .map(|i| (i.to_string(), DocumentId::from(&i.id), i.identifier.as_str())),
                    )
                    .chain(
                        repo.misc
                            .iter()
                            .map(|m| (m.to_string(), DocumentId::from(&m.id), m.identifier.as_str())),
                    )
                    .filter(|(_, id, _)| index.document(id).is_some())
                    .map(|(name, id, identifier)| {
                        SearchItem::new(name.clone(), id.as_str(), format!("{} {}", identifier, name))
                    })
                    .collect();
                FieldRequest::new(
                    "associated_document_id",
                    format!("document settled by «{}» ({})", trn, trn.description),
                    default,
                )
                .with_items(items)
            });

            (identifier_request, party_request, document_request)
        };

        let mut changed = 0;
        if let Some(request) = identifier_request {
            if let Some(answer) = self.ask(&request) {
                repo.statement.transactions[position].identifier = answer;
                changed += 1;
            }
        }
        if let Some(request) = party_request {
            if let Some(answer) = self.ask(&request) {
                repo.statement.transactions[position].associated_party_id = PartyId::new(answer);
                changed += 1;
            }
        }
        if let Some(request) = document_request {
            if let Some(answer) = self.ask(&request) {
                repo.statement.transactions[position].associated_document_id =
                    DocumentId::new(answer);
                changed += 1;
            }
        }
        changed
    }

    /// Ask for the identifier, accrual date, category and project of one
    /// expense. Returns the number of fields that changed.
    pub fn complete_expense(&mut self, repo: &mut Repository, position: usize) -> usize {
        if self.editor.is_none() || position >= repo.expenses.len() {
            return 0;
        }

        let exp = &repo.expenses[position];
        let identifier_request = exp.identifier.trim().is_empty().then(|| {
            FieldRequest::new(
                "identifier",
                format!("identifier of «{}»", exp),
                suggest_next_identifier(
                    repo.expenses.iter().map(|e| e.identifier.as_str()),
                    EXPENSE_PREFIX,
                ),
            )
        });
        let date_request = exp.date_of_accrual.is_none().then(|| {
            FieldRequest::new(
                "date_of_accrual",
                format!("accrual date of «{}» (YYYY-MM-DD)", exp),
                "",
            )
        });
        let config = repo.journal_config();
        let category_request = config
            .category_by_name(&exp.expense_category)
            .is_err()
            .then(|| {
                let items = config
                    .expense_categories
                    .iter()
                    .map(|c| SearchItem::new(c.name.as_str(), c.name.as_str(), format!("{} {}", c.name, c.account)))
                    .collect();
                FieldRequest::new(
                    "expense_category",
                    format!("expense category of «{}»", exp),
                    exp.expense_category.as_str(),
                )
                .with_items(items)
            });
        let project_request = (!exp.internal && exp.project_id.is_unset()).then(|| {
            let items = repo
                .projects
                .iter()
                .map(|p| SearchItem::new(p.to_string(), p.id.as_str(), format!("{} {}", p.name, p.identifier)))
                .collect();
            FieldRequest::new("project_id", format!("project of «{}»", exp), "").with_items(items)
        });

        let mut changed = 0;
        if let Some(request) = identifier_request {
            if let Some(answer) = self.ask(&request) {
                repo.expenses[position].identifier = answer;
                changed += 1;
            }
        }
        if let Some(request) = date_request {
            if let Some(date) = self
                .ask(&request)
                .and_then(|a| NaiveDate::parse_from_str(&a, "%Y-%m-%d").ok())
            {
                repo.expenses[position].date_of_accrual = Some(date);
                changed += 1;
            }
        }
        if let Some(request) = category_request {
            if let Some(answer) = self.ask(&request) {
                repo.expenses[position].expense_category = answer;
                changed += 1;
            }
        }
        if let Some(request) = project_request {
            if let Some(answer) = self.ask(&request) {
                repo.expenses[position].project_id = ProjectId::new(answer);
                changed += 1;
            }
        }
        changed
    }

    /// Walk every expense and transaction that fails validation or has no
    /// document yet. Returns the number of fields that changed.
    pub fn complete_repository(&mut self, repo: &mut Repository) -> usize {
        if self.editor.is_none() {
            return 0;
        }
        let mut changed = 0;
        for position in 0..repo.expenses.len() {
            let exp = &repo.expenses[position];
            let category_missing = repo.journal_config().category_by_name(&exp.expense_category).is_err();
            if !exp.validate().is_valid() || category_missing {
                changed += self.complete_expense(repo, position);
            }
        }
        for position in 0..repo.statement.transactions.len() {
            let trn = &repo.statement.transactions[position];
            if !trn.validate().is_valid() || !trn.has_document() {
                changed += self.complete_transaction(repo, position);
            }
        }
        changed
    }
}
