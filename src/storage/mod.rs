//! Storage layer for acc
//!
//! Reads a repository from YAML files (flat or project layout) and writes it
//! back. Every file read or written is remembered with its content hash so
//! that saving an unchanged repository touches nothing.

pub mod file_io;
pub mod flat;
pub mod project_layout;
pub mod repository;
pub mod resolve;

pub use file_io::{read_yaml, sha256_hex, write_atomic, Hashed};
pub use repository::Repository;
pub use resolve::{DanglingReference, RepositoryIndex, ResolutionReport};

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::thread::ScopedJoinHandle;

use tracing::{debug, info};

use crate::config::{AccConfig, RepositoryPaths};
use crate::error::{AccError, AccResult};

use file_io::{read_yaml_required, to_yaml_string, write_if_changed};

/// A repository as read from disk, with the hashes of the files it came from
#[derive(Debug)]
pub struct Loaded {
    pub repository: Repository,
    pub hashes: Vec<(PathBuf, String)>,
}

/// Wait for a reader thread, turning a panic into a storage error
pub(crate) fn join_reader<T>(handle: ScopedJoinHandle<'_, AccResult<T>>) -> AccResult<T> {
    handle
        .join()
        .map_err(|_| AccError::Storage("a file reader thread panicked".into()))?
}

/// Reject two entities of one collection sharing an Id.
///
/// Entities without an Id are skipped; validation reports them.
pub(crate) fn ensure_unique_ids<'p, I>(entity_type: &'static str, items: I) -> AccResult<()>
where
    I: IntoIterator<Item = (&'p Path, &'p str)>,
{
    let mut seen = HashSet::new();
    for (path, id) in items {
        if id.trim().is_empty() {
            continue;
        }
        if !seen.insert(id) {
            return Err(AccError::DuplicateId {
                entity_type,
                id: id.to_string(),
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// What a save did to the files on disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
}

/// Main storage coordinator for one repository folder
#[derive(Debug)]
pub struct Storage {
    paths: RepositoryPaths,
    hashes: RwLock<HashMap<PathBuf, String>>,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: RepositoryPaths) -> Self {
        Self {
            paths,
            hashes: RwLock::new(HashMap::new()),
        }
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &RepositoryPaths {
        &self.paths
    }

    /// Check if the repository has been initialized (has an `acc.yaml`)
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    fn remember(&self, path: PathBuf, hash: String) {
        match self.hashes.write() {
            Ok(mut hashes) => {
                hashes.insert(path, hash);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(path, hash);
            }
        }
    }

    fn forget(&self, path: &Path) {
        match self.hashes.write() {
            Ok(mut hashes) => {
                hashes.remove(path);
            }
            Err(poisoned) => {
                poisoned.into_inner().remove(path);
            }
        }
    }

    fn known_hash(&self, path: &Path) -> Option<String> {
        match self.hashes.read() {
            Ok(hashes) => hashes.get(path).cloned(),
            Err(poisoned) => poisoned.into_inner().get(path).cloned(),
        }
    }

    fn tracked_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = match self.hashes.read() {
            Ok(hashes) => hashes.keys().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().keys().cloned().collect(),
        };
        paths.sort();
        paths
    }

    /// Load all data from disk
    pub fn load(&self) -> AccResult<Repository> {
        let config_file = self.paths.config_file();
        if !config_file.exists() {
            return Err(AccError::Config(format!(
                "no {} found, run `acc init` first",
                config_file.display()
            )));
        }
        let Hashed { value: config, hash } = read_yaml_required::<AccConfig, _>(config_file)?;

        let project_mode = config.project_mode;
        let loaded = if project_mode {
            project_layout::load(&self.paths, config)?
        } else {
            flat::load(&self.paths, config)?
        };

        if let Some(hash) = hash {
            self.remember(config_file.to_path_buf(), hash);
        }
        let file_count = loaded.hashes.len();
        for (path, hash) in loaded.hashes {
            self.remember(path, hash);
        }

        let repo = loaded.repository;
        info!(
            root = %self.paths.root().display(),
            project_mode,
            files = file_count,
            expenses = repo.expenses.len(),
            invoices = repo.invoices.len(),
            transactions = repo.statement.transactions.len(),
            "repository loaded"
        );
        Ok(repo)
    }

    /// The files a save of `repo` produces, `acc.yaml` first
    fn plan(&self, repo: &Repository) -> AccResult<Vec<(PathBuf, String)>> {
        let mut files = vec![(
            self.paths.config_file().to_path_buf(),
            to_yaml_string(&repo.config)?,
        )];
        if repo.config.project_mode {
            files.extend(project_layout::plan(repo, &self.paths)?);
        } else {
            files.extend(flat::plan(repo, &self.paths)?);
        }
        Ok(files)
    }

    /// Order `repo` the way a load of its layout returns it.
    ///
    /// The flat layout keeps any order; the project layout has a canonical
    /// one, see [`project_layout::arrange`].
    pub fn arrange(&self, repo: &mut Repository) {
        if repo.config.project_mode {
            project_layout::arrange(repo, &self.paths);
        }
    }

    /// Save all data to disk, skipping files whose content did not change
    pub fn save(&self, repo: &Repository) -> AccResult<SaveSummary> {
        let files = self.plan(repo)?;
        let mut summary = SaveSummary::default();

        for (path, contents) in &files {
            let known = self.known_hash(path);
            let (hash, written) = write_if_changed(path, contents, known.as_deref())?;
            if written {
                debug!(path = %path.display(), "file written");
                summary.written.push(path.clone());
            } else {
                summary.unchanged.push(path.clone());
            }
            self.remember(path.clone(), hash);
        }

        if repo.config.project_mode {
            let planned: HashSet<&PathBuf> = files.iter().map(|(p, _)| p).collect();
            for stale in self.tracked_paths() {
                if planned.contains(&stale) || !project_layout::is_managed(&stale, &self.paths) {
                    continue;
                }
                if stale.exists() {
                    fs::remove_file(&stale).map_err(|e| {
                        AccError::Storage(format!("Failed to remove {}: {}", stale.display(), e))
                    })?;
                    if let Some(parent) = stale.parent() {
                        // Only succeeds for empty folders
                        let _ = fs::remove_dir(parent);
                    }
                    debug!(path = %stale.display(), "stale file removed");
                    summary.removed.push(stale.clone());
                }
                self.forget(&stale);
            }
        }

        info!(
            written = summary.written.len(),
            unchanged = summary.unchanged.len(),
            removed = summary.removed.len(),
            "repository saved"
        );
        Ok(summary)
    }

    /// Create a fresh repository with a default `acc.yaml` and empty
    /// collection files. Refuses to overwrite an existing repository.
    pub fn init(&self, project_mode: bool) -> AccResult<Repository> {
        if self.is_initialized() {
            return Err(AccError::Config(format!(
                "{} already exists",
                self.paths.config_file().display()
            )));
        }
        fs::create_dir_all(self.paths.root()).map_err(|e| {
            AccError::Storage(format!(
                "Failed to create directory {}: {}",
                self.paths.root().display(),
                e
            ))
        })?;

        let mut config = AccConfig::default();
        config.project_mode = project_mode;
        let repo = Repository::with_config(config);
        self.save(&repo)?;
        Ok(repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use crate::models::{
        DocumentId, Expense, ExpenseCategory, Invoice, JournalMode, Money, Party, PartyKind,
        Project, Transaction, TransactionKind,
    };

    fn storage(temp_dir: &TempDir) -> Storage {
        Storage::new(RepositoryPaths::with_base_dir(temp_dir.path().to_path_buf()))
    }

    fn sample(project_mode: bool) -> Repository {
        let mut config = AccConfig::default();
        config.project_mode = project_mode;
        config
            .journal_config
            .expense_categories
            .push(ExpenseCategory::new("Hardware", "expenses:hardware"));
        let mut repo = Repository::with_config(config);

        let acme = Party::new(PartyKind::Customer, "c-1", "ACME Corp");
        let kai = Party::new(PartyKind::Employee, "p-01", "Kai");
        let project = Project::new("p-1", "Web Site", acme.id.clone());

        let mut exp = Expense::new("e-21-3", "Cables", Money::chf(12000));
        exp.advanced_by_third_party = true;
        exp.advanced_third_party_id = kai.id.clone();
        exp.expense_category = "Hardware".into();
        exp.project_id = project.id.clone();
        exp.date_of_accrual = NaiveDate::from_ymd_opt(2021, 3, 1);

        let mut inv = Invoice::new("i-21-1", "Web Site", Money::chf(250000));
        inv.customer_id = acme.id.clone();
        inv.project_id = project.id.clone();

        let mut trn = Transaction::new(
            "t-21-7",
            TransactionKind::Debit,
            NaiveDate::from_ymd_opt(2021, 3, 20).unwrap(),
            Money::chf(12000),
        );
        trn.associated_document_id = DocumentId::from(&exp.id);
        trn.journal_mode = JournalMode::Auto;

        repo.customers.push(acme);
        repo.employees.push(kai);
        repo.projects.push(project);
        repo.expenses.push(exp);
        repo.invoices.push(inv);
        repo.statement.transactions.push(trn);
        repo
    }

    #[test]
    fn test_load_requires_config() {
        let temp_dir = TempDir::new().unwrap();
        let err = storage(&temp_dir).load().unwrap_err();
        assert!(matches!(err, AccError::Config(_)));
    }

    #[test]
    fn test_init_creates_config_and_refuses_twice() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);
        storage.init(false).unwrap();

        assert!(storage.is_initialized());
        assert!(temp_dir.path().join("expenses.yaml").exists());
        assert!(storage.init(false).is_err());
        assert_eq!(storage.load().unwrap(), Repository::default());
    }

    #[test]
    fn test_flat_round_trip_is_byte_identical() {
        let temp_dir = TempDir::new().unwrap();
        let repo = sample(false);
        storage(&temp_dir).save(&repo).unwrap();

        let before = fs::read(temp_dir.path().join("expenses.yaml")).unwrap();

        let fresh = storage(&temp_dir);
        let loaded = fresh.load().unwrap();
        assert_eq!(loaded, repo);

        let summary = fresh.save(&loaded).unwrap();
        assert!(summary.written.is_empty(), "{:?}", summary.written);
        assert_eq!(fs::read(temp_dir.path().join("expenses.yaml")).unwrap(), before);
    }

    #[test]
    fn test_changed_collection_is_the_only_file_written() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);
        storage.save(&sample(false)).unwrap();

        let mut repo = storage.load().unwrap();
        repo.expenses[0].name = "Network cables".into();
        let summary = storage.save(&repo).unwrap();
        assert_eq!(summary.written, vec![temp_dir.path().join("expenses.yaml")]);
    }

    #[test]
    fn test_duplicate_ids_are_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);
        let mut repo = sample(false);
        let copy = repo.expenses[0].clone();
        repo.expenses.push(copy);
        storage.save(&repo).unwrap();

        let err = storage.load().unwrap_err();
        match err {
            AccError::DuplicateId { entity_type, path, .. } => {
                assert_eq!(entity_type, "Expense");
                assert_eq!(path, temp_dir.path().join("expenses.yaml"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unparseable_file_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);
        storage.save(&sample(false)).unwrap();
        fs::write(temp_dir.path().join("invoices.yaml"), "- id: [broken\n").unwrap();

        let err = storage.load().unwrap_err();
        assert!(err.is_structural());
        assert!(err.to_string().contains("invoices.yaml"));
    }

    #[test]
    fn test_project_layout_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let repo = sample(true);
        storage(&temp_dir).save(&repo).unwrap();

        assert!(temp_dir
            .path()
            .join("projects/acme-corp/web-site/project.yaml")
            .exists());

        let fresh = storage(&temp_dir);
        let loaded = fresh.load().unwrap();
        assert_eq!(loaded, repo);
        assert!(fresh.save(&loaded).unwrap().written.is_empty());
    }

    #[test]
    fn test_project_layout_round_trip_keeps_arranged_order() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);
        let mut repo = sample(true);

        let zed = Party::new(PartyKind::Customer, "c-0", "Zed");
        repo.customers.insert(0, zed);
        let mut chairs = Expense::new("e-21-1", "Chairs", Money::chf(30000));
        chairs.internal = true;
        chairs.date_of_accrual = NaiveDate::from_ymd_opt(2021, 6, 1);
        repo.expenses.insert(0, chairs);

        let unarranged = storage.plan(&repo).unwrap();
        storage.arrange(&mut repo);
        assert_eq!(storage.plan(&repo).unwrap(), unarranged);

        let customers: Vec<&str> = repo.customers.iter().map(|c| c.identifier.as_str()).collect();
        let expenses: Vec<&str> = repo.expenses.iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(customers, vec!["c-1", "c-0"]);
        assert_eq!(expenses, vec!["e-21-3", "e-21-1"]);

        storage.save(&repo).unwrap();
        let loaded = storage.load().unwrap();
        assert_eq!(loaded, repo);

        let mut again = loaded.clone();
        storage.arrange(&mut again);
        assert_eq!(again, loaded);
    }

    #[test]
    fn test_flat_layout_keeps_any_order() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);
        let mut repo = sample(false);
        repo.customers
            .insert(0, Party::new(PartyKind::Customer, "c-0", "Zed"));

        storage.arrange(&mut repo);
        assert_eq!(repo.customers[0].identifier, "c-0");
        storage.save(&repo).unwrap();
        assert_eq!(storage.load().unwrap(), repo);
    }

    #[test]
    fn test_project_layout_removes_stale_files() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);
        storage.save(&sample(true)).unwrap();

        let mut repo = storage.load().unwrap();
        repo.projects[0].name = "Shop".into();
        let summary = storage.save(&repo).unwrap();

        let old = temp_dir.path().join("projects/acme-corp/web-site/project.yaml");
        assert_eq!(summary.removed, vec![old.clone()]);
        assert!(!old.exists());
        assert!(temp_dir
            .path()
            .join("projects/acme-corp/shop/project.yaml")
            .exists());
    }
}
