//! One-screen summaries printed after import, reconciliation and journal runs

use crate::journal::Journal;
use crate::services::{ImportSummary, ReconciliationSummary};

pub fn format_import_summary(summary: &ImportSummary) -> String {
    let mut output = format!("Imported {} transaction(s)", summary.imported);
    if !summary.imported_identifiers.is_empty() {
        output.push_str(&format!(": {}", summary.imported_identifiers.join(", ")));
    }
    output.push('\n');
    if summary.duplicates_skipped > 0 {
        output.push_str(&format!(
            "Skipped {} transaction(s) already in the statement\n",
            summary.duplicates_skipped
        ));
    }
    if summary.currency_rejected > 0 {
        output.push_str(&format!(
            "Rejected {} transaction(s) in a foreign currency\n",
            summary.currency_rejected
        ));
    }
    output
}

pub fn format_reconciliation_summary(summary: &ReconciliationSummary) -> String {
    let mut output = String::new();
    for pair in &summary.matched {
        output.push_str(&format!("  {:<12} -> {}\n", pair.transaction, pair.document));
    }
    output.push_str(&format!(
        "Matched {}, unmatched {}, already linked {}, settlements updated {}\n",
        summary.matched.len(),
        summary.unmatched.len(),
        summary.skipped.len(),
        summary.settlements_updated
    ));
    if !summary.unmatched.is_empty() {
        output.push_str(&format!("Unmatched: {}\n", summary.unmatched.join(", ")));
    }
    output
}

pub fn format_journal_summary(journal: &Journal) -> String {
    let todos = journal.todo_count();
    if todos == 0 {
        format!("Wrote {} journal entries\n", journal.len())
    } else {
        format!(
            "Wrote {} journal entries, {} marked TODO\n",
            journal.len(),
            todos
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MatchedPair;

    #[test]
    fn test_import_summary() {
        let summary = ImportSummary {
            imported: 2,
            duplicates_skipped: 1,
            currency_rejected: 0,
            imported_identifiers: vec!["t-1".into(), "t-2".into()],
        };
        let text = format_import_summary(&summary);
        assert!(text.starts_with("Imported 2 transaction(s): t-1, t-2\n"));
        assert!(text.contains("Skipped 1"));
        assert!(!text.contains("Rejected"));
    }

    #[test]
    fn test_reconciliation_summary() {
        let summary = ReconciliationSummary {
            matched: vec![MatchedPair {
                transaction: "t-21-7".into(),
                document: "e-21-3".into(),
            }],
            unmatched: vec!["t-21-9".into()],
            skipped: Vec::new(),
            settlements_updated: 1,
        };
        let text = format_reconciliation_summary(&summary);
        assert!(text.contains("t-21-7       -> e-21-3"));
        assert!(text.contains("Matched 1, unmatched 1, already linked 0, settlements updated 1"));
        assert!(text.ends_with("Unmatched: t-21-9\n"));
    }

    #[test]
    fn test_journal_summary() {
        assert_eq!(format_journal_summary(&Journal::default()), "Wrote 0 journal entries\n");
    }
}
