//! Validation conditions and flaw levels
//!
//! Every entity describes itself as a list of conditions. A condition whose
//! predicate holds is a flaw; the flaw level decides which commands it blocks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity class of a validation flaw, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlawLevel {
    /// Has to be fixed right now
    Fundamental,
    /// Should be fixed before importing
    BeforeImport,
    /// Should be fixed before reconciliation
    BeforeMerge,
    /// Should be fixed before exporting the journal
    BeforeExport,
    /// Informational, never blocks anything
    Undefined,
}

impl FlawLevel {
    /// Whether a flaw of this level blocks a command gated at `gate`.
    ///
    /// A gate blocks its own level and every more severe one.
    pub fn blocks(&self, gate: FlawLevel) -> bool {
        *self != FlawLevel::Undefined && *self <= gate
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fundamental => "fundamental",
            Self::BeforeImport => "before-import",
            Self::BeforeMerge => "before-merge",
            Self::BeforeExport => "before-export",
            Self::Undefined => "undefined",
        }
    }
}

impl fmt::Display for FlawLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation condition: a predicate, its message and its level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub active: bool,
    pub message: String,
    pub level: FlawLevel,
}

impl Condition {
    pub fn new(active: bool, message: impl Into<String>, level: FlawLevel) -> Self {
        Self {
            active,
            message: message.into(),
            level,
        }
    }

    pub fn fundamental(active: bool, message: impl Into<String>) -> Self {
        Self::new(active, message, FlawLevel::Fundamental)
    }

    pub fn before_export(active: bool, message: impl Into<String>) -> Self {
        Self::new(active, message, FlawLevel::BeforeExport)
    }

    pub fn undefined(active: bool, message: impl Into<String>) -> Self {
        Self::new(active, message, FlawLevel::Undefined)
    }
}

/// An active condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flaw {
    pub reason: String,
    pub level: FlawLevel,
}

/// Outcome of validating one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub kind: &'static str,
    pub name: String,
    pub flaws: Vec<Flaw>,
}

impl ValidationResult {
    /// A result is valid when no condition is active
    pub fn is_valid(&self) -> bool {
        self.flaws.is_empty()
    }
}

/// Common shape of every validated entity
pub trait Record {
    /// Kind name shown in reports, e.g. `Expense`
    fn kind_name(&self) -> &'static str;

    /// User-facing identifier (`e-…`, `i-…`) or name where there is none
    fn identifier(&self) -> &str;

    /// The entity's own conditions, independent of the rest of the repository
    fn conditions(&self) -> Vec<Condition>;

    fn validate(&self) -> ValidationResult {
        let flaws = self
            .conditions()
            .into_iter()
            .filter(|c| c.active)
            .map(|c| Flaw {
                reason: c.message,
                level: c.level,
            })
            .collect();
        ValidationResult {
            kind: self.kind_name(),
            name: self.identifier().to_string(),
            flaws,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy {
        empty_name: bool,
    }

    impl Record for Dummy {
        fn kind_name(&self) -> &'static str {
            "Dummy"
        }

        fn identifier(&self) -> &str {
            "d-1"
        }

        fn conditions(&self) -> Vec<Condition> {
            vec![
                Condition::before_export(self.empty_name, "name is empty"),
                Condition::fundamental(false, "never active"),
            ]
        }
    }

    #[test]
    fn test_level_ordering() {
        assert!(FlawLevel::Fundamental < FlawLevel::BeforeImport);
        assert!(FlawLevel::BeforeMerge < FlawLevel::BeforeExport);
        assert!(FlawLevel::BeforeExport < FlawLevel::Undefined);
    }

    #[test]
    fn test_blocks() {
        assert!(FlawLevel::Fundamental.blocks(FlawLevel::BeforeExport));
        assert!(FlawLevel::BeforeExport.blocks(FlawLevel::BeforeExport));
        assert!(!FlawLevel::BeforeExport.blocks(FlawLevel::BeforeMerge));
        assert!(!FlawLevel::Undefined.blocks(FlawLevel::Undefined));
    }

    #[test]
    fn test_display() {
        assert_eq!(FlawLevel::BeforeExport.to_string(), "before-export");
        assert_eq!(FlawLevel::Fundamental.to_string(), "fundamental");
    }

    #[test]
    fn test_validate_collects_active_conditions() {
        let valid = Dummy { empty_name: false }.validate();
        assert!(valid.is_valid());

        let invalid = Dummy { empty_name: true }.validate();
        assert_eq!(invalid.kind, "Dummy");
        assert_eq!(invalid.name, "d-1");
        assert_eq!(
            invalid.flaws,
            vec![Flaw {
                reason: "name is empty".into(),
                level: FlawLevel::BeforeExport
            }]
        );
    }
}
