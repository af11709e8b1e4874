//! hledger text output

use std::fmt::Write as _;
use std::path::Path;

use crate::error::AccResult;
use crate::storage::write_atomic;

use super::Journal;

impl Journal {
    /// Alias header, then one block per entry separated by blank lines
    pub fn render(&self) -> String {
        let mut out = String::new();
        for alias in &self.aliases {
            let _ = writeln!(out, "alias {} = {}", alias.from, alias.to);
        }
        if !self.aliases.is_empty() {
            out.push('\n');
        }

        let blocks: Vec<String> = self.entries.iter().map(|e| e.block()).collect();
        out.push_str(&blocks.join("\n\n"));
        if !blocks.is_empty() {
            out.push('\n');
        }
        out
    }

    /// Render into `path`, replacing it atomically
    pub fn write_to(&self, path: &Path) -> AccResult<()> {
        write_atomic(path, self.render().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;
    use crate::journal::{Comment, Entry, EntryStatus};
    use crate::models::{AccountAlias, Money};

    fn entry(day: u32) -> Entry {
        Entry {
            date: NaiveDate::from_ymd_opt(2021, 1, day).unwrap(),
            status: EntryStatus::Unmarked,
            description: format!("entry {}", day),
            comment: Comment::new("default", "t"),
            account1: "assets:bank".into(),
            account2: "other:unknown".into(),
            amount: Money::chf(100),
        }
    }

    #[test]
    fn test_empty_journal_renders_nothing() {
        assert_eq!(Journal::default().render(), "");
    }

    #[test]
    fn test_aliases_come_first() {
        let journal = Journal {
            aliases: vec![AccountAlias {
                from: "bank".into(),
                to: "assets:bank".into(),
            }],
            entries: vec![entry(1), entry(2)],
        };
        let text = journal.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "alias bank = assets:bank");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "2021-01-01 entry 1 ; parsed as default");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "2021-01-02 entry 2 ; parsed as default");
        assert_eq!(lines.len(), 9);
        assert!(text.ends_with("-CHF1\n"));
    }

    #[test]
    fn test_write_to_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("2021.journal");
        let journal = Journal {
            aliases: Vec::new(),
            entries: vec![entry(3)],
        };
        journal.write_to(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), journal.render());
    }
}
