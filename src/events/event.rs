//! Event data structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Info,
    Warning,
    Error,
}

/// Something the engine wants the outside world to know about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum EngineEvent {
    Info {
        message: String,
    },
    Warning {
        message: String,
    },
    Error {
        message: String,
    },
    /// A reference pointing to an entity that does not exist
    DanglingReference {
        owner: String,
        field: String,
        target: String,
        id: String,
    },
    /// The matcher linked a transaction to a document
    MatchFound {
        transaction: String,
        document: String,
    },
    /// A settling transaction's amount differs from its document's amount
    AmountMismatch {
        transaction: String,
        document: String,
        expected: String,
        actual: String,
    },
    /// A journal entry needs to be finished by hand
    ManualCorrection {
        element: String,
    },
}

impl EngineEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self::Info {
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn level(&self) -> EventLevel {
        match self {
            Self::Info { .. } | Self::MatchFound { .. } => EventLevel::Info,
            Self::Error { .. } => EventLevel::Error,
            Self::Warning { .. }
            | Self::DanglingReference { .. }
            | Self::AmountMismatch { .. }
            | Self::ManualCorrection { .. } => EventLevel::Warning,
        }
    }
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info { message } | Self::Warning { message } | Self::Error { message } => {
                f.write_str(message)
            }
            Self::DanglingReference {
                owner,
                field,
                target,
                id,
            } => write!(f, "{}: {} references unknown {} \"{}\"", owner, field, target, id),
            Self::MatchFound {
                transaction,
                document,
            } => write!(f, "matched {} with {}", transaction, document),
            Self::AmountMismatch {
                transaction,
                document,
                expected,
                actual,
            } => write!(
                f,
                "{} settles {} with {} instead of {}",
                transaction, document, actual, expected
            ),
            Self::ManualCorrection { element } => {
                write!(f, "journal entry of «{}» needs manual correction", element)
            }
        }
    }
}
