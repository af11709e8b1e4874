//! Service layer for acc
//!
//! The services work on an in-memory [`Repository`](crate::storage::Repository):
//! validation, matching, reconciliation, filtering, statement import and
//! interactive completion.

pub mod editor;
pub mod filter;
pub mod import;
pub mod matcher;
pub mod reconciliation;
pub mod validation;

pub use editor::{CompletionService, Editor, FieldRequest, ScriptedEditor, SearchItem};
pub use filter::{filter, filter_year, select, sort_by_date, FilterCriteria, RecordKind, Selection};
pub use import::{
    ColumnMapping, CsvImporter, ImportService, ImportSummary, ImportedTransaction,
    StatementImporter,
};
pub use matcher::{document_identifiers, Matcher};
pub use reconciliation::{MatchedPair, ReconciliationService, ReconciliationSummary};
pub use validation::{ReportRow, ValidationReport, ValidationService};
