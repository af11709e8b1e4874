//! Error types for acc
//!
//! Structural failures (unreadable files, unparseable content, duplicate ids)
//! surface as `AccError`. Semantic problems never do: they end up as rows in
//! the validation report or as `TODO:` comments in the journal.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for acc operations
#[derive(Error, Debug)]
pub enum AccError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// YAML serialization errors without a known source file
    #[error("YAML error: {0}")]
    Yaml(String),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors (reading, writing, renaming collection files)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Unparseable collection file, with the position reported by the parser
    #[error("Failed to parse {}{}: {message}", .path.display(), format_location(.line, .column))]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    /// Two entities of one collection share the same Id
    #[error("Duplicate {entity_type} id '{id}' in {}", .path.display())]
    DuplicateId {
        entity_type: &'static str,
        id: String,
        path: PathBuf,
    },

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Arithmetic or comparison between amounts of different currencies
    #[error("Currency mismatch: {left} and {right} cannot be combined")]
    CurrencyMismatch { left: String, right: String },

    /// Import errors
    #[error("Import error: {0}")]
    Import(String),

    /// A command refused to run because of validation flaws
    #[error("Refusing to {command}: {count} flaw(s) at level {level} or more severe (use --force to override)")]
    Gated {
        command: &'static str,
        level: String,
        count: usize,
    },
}

fn format_location(line: &Option<usize>, column: &Option<usize>) -> String {
    match (line, column) {
        (Some(line), Some(column)) => format!(" at line {}, column {}", line, column),
        (Some(line), None) => format!(" at line {}", line),
        _ => String::new(),
    }
}

impl AccError {
    /// Build a parse error from a serde_yaml error, keeping its location
    pub fn parse_yaml(path: impl Into<PathBuf>, err: &serde_yaml::Error) -> Self {
        let location = err.location();
        Self::Parse {
            path: path.into(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
            message: err.to_string(),
        }
    }

    /// Check if this error is a structural failure of the on-disk data
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::DuplicateId { .. } | Self::Storage(_) | Self::Io(_)
        )
    }

    /// Check if a command was refused by the flaw gate
    pub fn is_gated(&self) -> bool {
        matches!(self, Self::Gated { .. })
    }
}

impl From<std::io::Error> for AccError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_yaml::Error> for AccError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err.to_string())
    }
}

impl From<serde_json::Error> for AccError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for AccError {
    fn from(err: csv::Error) -> Self {
        Self::Import(err.to_string())
    }
}

impl From<regex::Error> for AccError {
    fn from(err: regex::Error) -> Self {
        Self::Config(format!("invalid regular expression: {}", err))
    }
}

/// Result type alias for acc operations
pub type AccResult<T> = Result<T, AccError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AccError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_parse_error_with_location() {
        let err = AccError::Parse {
            path: PathBuf::from("expenses.yaml"),
            line: Some(4),
            column: Some(7),
            message: "invalid type".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse expenses.yaml at line 4, column 7: invalid type"
        );
        assert!(err.is_structural());
    }

    #[test]
    fn test_parse_yaml_keeps_location() {
        let yaml_err = serde_yaml::from_str::<Vec<u32>>("- 1\n- nope\n").unwrap_err();
        let err = AccError::parse_yaml("numbers.yaml", &yaml_err);
        match err {
            AccError::Parse { line, .. } => assert_eq!(line, Some(2)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_id_error() {
        let err = AccError::DuplicateId {
            entity_type: "Expense",
            id: "abc".into(),
            path: PathBuf::from("expenses.yaml"),
        };
        assert_eq!(err.to_string(), "Duplicate Expense id 'abc' in expenses.yaml");
    }

    #[test]
    fn test_gated_error() {
        let err = AccError::Gated {
            command: "export the journal",
            level: "before-export".into(),
            count: 2,
        };
        assert!(err.is_gated());
        assert!(err.to_string().contains("--force"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AccError = io_err.into();
        assert!(matches!(err, AccError::Io(_)));
    }
}
