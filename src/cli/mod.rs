//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod filter;
pub mod import;
pub mod init;
pub mod journal;
pub mod reconcile;
pub mod validate;

pub use filter::{handle_filter_command, FilterArgs, OutputFormat};
pub use import::{handle_import_command, ImportArgs, MappingPreset};
pub use init::{handle_init_command, InitArgs};
pub use journal::{handle_journal_command, JournalArgs};
pub use reconcile::{handle_reconcile_command, ReconcileArgs};
pub use validate::{handle_validate_command, ValidateArgs};

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::RepositoryPaths;
use crate::error::{AccError, AccResult};
use crate::events::TracingSink;
use crate::models::FlawLevel;
use crate::services::{ValidationReport, ValidationService};
use crate::storage::{Repository, Storage};

/// Options every command understands
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// `acc.yaml` or the repository folder
    pub input: Option<PathBuf>,
    /// Run even when validation flaws would block the command
    pub force: bool,
}

impl GlobalOptions {
    pub fn paths(&self) -> AccResult<RepositoryPaths> {
        RepositoryPaths::resolve(self.input.as_deref())
    }

    pub fn storage(&self) -> AccResult<Storage> {
        Ok(Storage::new(self.paths()?))
    }
}

/// Load the repository and refuse to go on while flaws at `gate` or worse
/// are present
pub(crate) fn load_gated(
    storage: &Storage,
    command: &'static str,
    gate: FlawLevel,
    force: bool,
) -> AccResult<(Repository, ValidationReport)> {
    let repo = storage.load()?;
    let report = ValidationService::new(&repo).validate(&TracingSink);
    if force && report.blocking(gate).next().is_some() {
        tracing::warn!(command, level = %gate, "running despite validation flaws");
    }
    report.gate(command, gate, force)?;
    Ok((repo, report))
}

/// Write `text` to `output`, or to stdout without one
pub(crate) fn write_output(output: Option<&Path>, text: &str) -> AccResult<()> {
    match output {
        Some(path) => crate::storage::write_atomic(path, text.as_bytes()),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(|e| AccError::Io(format!("Failed to write to stdout: {}", e)))
        }
    }
}

/// Save into the loaded repository, or into `output` when given
pub(crate) fn save_repository(
    storage: &Storage,
    output: Option<&Path>,
    repo: &mut Repository,
) -> AccResult<()> {
    let summary = match output {
        Some(path) => {
            let target = Storage::new(RepositoryPaths::from_input(path));
            target.arrange(repo);
            target.save(repo)?
        }
        None => {
            storage.arrange(repo);
            storage.save(repo)?
        }
    };
    if summary.written.is_empty() && summary.removed.is_empty() {
        println!("Repository unchanged.");
    } else {
        println!(
            "Wrote {} file(s), removed {}.",
            summary.written.len(),
            summary.removed.len()
        );
    }
    Ok(())
}
