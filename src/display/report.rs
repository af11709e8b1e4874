//! Validation report formatting
//!
//! Title, a bordered `Type | Name | Reason | Level` table and a legend of
//! the flaw levels.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::FlawLevel;
use crate::services::ValidationReport;

const TITLE: &str = "VALIDATION REPORT";

#[derive(Tabled)]
struct ReportLine<'a> {
    #[tabled(rename = "Type")]
    kind: &'a str,
    #[tabled(rename = "Name")]
    name: &'a str,
    #[tabled(rename = "Reason")]
    reason: &'a str,
    #[tabled(rename = "Level")]
    level: FlawLevel,
}

/// Explanation of a flaw level as printed in the legend
pub fn level_description(level: FlawLevel) -> &'static str {
    match level {
        FlawLevel::Fundamental => "has to be fixed right now",
        FlawLevel::BeforeImport => "should be fixed before importing",
        FlawLevel::BeforeMerge => "should be fixed before reconciliation",
        FlawLevel::BeforeExport => "should be fixed before exporting the journal",
        FlawLevel::Undefined => "informational",
    }
}

fn legend() -> String {
    let mut out = String::from("Levels:\n");
    for level in [
        FlawLevel::Fundamental,
        FlawLevel::BeforeImport,
        FlawLevel::BeforeMerge,
        FlawLevel::BeforeExport,
    ] {
        out.push_str(&format!("  {:<14} {}\n", level.as_str(), level_description(level)));
    }
    out
}

/// Render the report as plain text. Rows are printed most severe first.
pub fn format_validation_report(report: &ValidationReport) -> String {
    let mut sorted = report.clone();
    sorted.sort_by_level();

    let mut output = String::new();
    output.push_str(TITLE);
    output.push('\n');
    output.push_str(&"-".repeat(TITLE.len()));
    output.push_str("\n\n");

    if sorted.is_empty() {
        output.push_str("No flaws found.\n");
    } else {
        let lines = sorted.rows.iter().map(|row| ReportLine {
            kind: &row.kind,
            name: &row.identifier,
            reason: &row.reason,
            level: row.level,
        });
        let mut table = Table::new(lines);
        table.with(Style::ascii());
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(&format!("\n{} flaw(s) found.\n", sorted.len()));
    }

    output.push('\n');
    output.push_str(&legend());
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ReportRow;

    fn row(kind: &str, identifier: &str, reason: &str, level: FlawLevel) -> ReportRow {
        ReportRow {
            kind: kind.into(),
            identifier: identifier.into(),
            reason: reason.into(),
            level,
        }
    }

    #[test]
    fn test_empty_report() {
        let text = format_validation_report(&ValidationReport::default());
        assert!(text.starts_with("VALIDATION REPORT\n-----------------\n"));
        assert!(text.contains("No flaws found."));
        assert!(text.contains("before-merge   should be fixed before reconciliation"));
    }

    #[test]
    fn test_table_sorted_by_level() {
        let report = ValidationReport {
            rows: vec![
                row("Expense", "e-1", "no accrual date set", FlawLevel::BeforeExport),
                row("Expense", "e-2", "identifier \"e-2\" is used 2 times", FlawLevel::Fundamental),
            ],
        };
        let text = format_validation_report(&report);
        for header in ["Type", "Name", "Reason", "Level"] {
            assert!(text.contains(header));
        }
        let fundamental = text.find("e-2").unwrap();
        let export = text.find("e-1").unwrap();
        assert!(fundamental < export);
        assert!(text.contains("| fundamental "));
        assert!(text.contains("2 flaw(s) found."));
        assert!(text.contains("+--"));
    }
}
