//! Display formatting for terminal output
//!
//! Plain-text renderings of the validation report and of the command
//! summaries.

pub mod report;
pub mod summary;

pub use report::{format_validation_report, level_description};
pub use summary::{format_import_summary, format_journal_summary, format_reconciliation_summary};
