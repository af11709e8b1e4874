//! acc - plain-text accounting assistant
//!
//! This library keeps the records of a small organization (expenses,
//! invoices, misc records, bank statements, customers, employees and
//! projects) in human-editable YAML files, validates them, links bank
//! transactions to the documents that caused them and renders an hledger
//! journal.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Repository paths and the `acc.yaml` main configuration
//! - `error`: Custom error types
//! - `events`: Typed engine events and the sinks receiving them
//! - `models`: Core data models (parties, documents, transactions, etc.)
//! - `storage`: YAML file storage, flat and project layout
//! - `services`: Validation, matching, reconciliation, filtering, import
//! - `journal`: Journal entries and hledger rendering
//! - `display`: Plain-text reports
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use acc::config::RepositoryPaths;
//! use acc::events::NullSink;
//! use acc::journal::Journal;
//! use acc::storage::Storage;
//!
//! let storage = Storage::new(RepositoryPaths::with_base_dir("books".into()));
//! let repo = storage.load()?;
//! let journal = Journal::from_repository(&repo, &NullSink);
//! print!("{}", journal.render());
//! ```

/// Declares a function returning a lazily compiled, constant regex
macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod journal;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{AccError, AccResult};
