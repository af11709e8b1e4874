//! Main repository configuration (`acc.yaml`)
//!
//! Holds the company, the journal configuration, the repository currency,
//! the layout mode and the relative paths of the collection files.

use serde::{Deserialize, Serialize};

use super::paths::RepositoryPaths;
use crate::error::{AccError, AccResult};
use crate::models::{Company, Currency, JournalConfig};

/// Relative paths of the collection files in flat layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSet {
    #[serde(default = "default_expenses_file")]
    pub expenses: String,

    #[serde(default = "default_invoices_file")]
    pub invoices: String,

    #[serde(default = "default_misc_file")]
    pub misc: String,

    #[serde(default = "default_parties_file")]
    pub parties: String,

    #[serde(default = "default_projects_file")]
    pub projects: String,

    #[serde(default = "default_statement_file")]
    pub statement: String,
}

fn default_expenses_file() -> String {
    "expenses.yaml".to_string()
}

fn default_invoices_file() -> String {
    "invoices.yaml".to_string()
}

fn default_misc_file() -> String {
    "misc.yaml".to_string()
}

fn default_parties_file() -> String {
    "parties.yaml".to_string()
}

fn default_projects_file() -> String {
    "projects.yaml".to_string()
}

fn default_statement_file() -> String {
    "statement.yaml".to_string()
}

impl Default for FileSet {
    fn default() -> Self {
        Self {
            expenses: default_expenses_file(),
            invoices: default_invoices_file(),
            misc: default_misc_file(),
            parties: default_parties_file(),
            projects: default_projects_file(),
            statement: default_statement_file(),
        }
    }
}

/// Contents of `acc.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccConfig {
    #[serde(default)]
    pub company: Company,

    #[serde(default)]
    pub journal_config: JournalConfig,

    /// The single currency of this repository
    #[serde(default)]
    pub currency: Currency,

    /// Use the folder-per-customer-per-project layout
    #[serde(default)]
    pub project_mode: bool,

    #[serde(default)]
    pub files: FileSet,
}

impl Default for AccConfig {
    fn default() -> Self {
        Self {
            company: Company::default(),
            journal_config: JournalConfig::default(),
            currency: Currency::default(),
            project_mode: false,
            files: FileSet::default(),
        }
    }
}

impl AccConfig {
    /// Load the configuration; a missing `acc.yaml` is an error
    pub fn load(paths: &RepositoryPaths) -> AccResult<Self> {
        let path = paths.config_file();
        if !path.exists() {
            return Err(AccError::Config(format!(
                "no {} found, run `acc init` first",
                path.display()
            )));
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AccError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_yaml::from_str(&contents).map_err(|e| AccError::parse_yaml(path, &e))
    }

    /// Load the configuration, or the defaults when there is none yet
    pub fn load_or_default(paths: &RepositoryPaths) -> AccResult<Self> {
        if paths.is_initialized() {
            Self::load(paths)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AccConfig::default();
        assert_eq!(config.currency.code(), "CHF");
        assert!(!config.project_mode);
        assert_eq!(config.files.expenses, "expenses.yaml");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AccConfig = serde_yaml::from_str(
            "company:\n  name: Solutions AG\ncurrency: EUR\nfiles:\n  expenses: data/exp.yaml\n",
        )
        .unwrap();
        assert_eq!(config.company.name, "Solutions AG");
        assert_eq!(config.currency.code(), "EUR");
        assert_eq!(config.files.expenses, "data/exp.yaml");
        assert_eq!(config.files.invoices, "invoices.yaml");
        assert_eq!(config.journal_config.bank_account, "assets:bank");
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = RepositoryPaths::with_base_dir(temp_dir.path().to_path_buf());
        assert!(matches!(AccConfig::load(&paths), Err(AccError::Config(_))));
        assert_eq!(AccConfig::load_or_default(&paths).unwrap(), AccConfig::default());
    }

    #[test]
    fn test_unparseable_config_reports_location() {
        let temp_dir = TempDir::new().unwrap();
        let paths = RepositoryPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.config_file(), "currency: EURO\n").unwrap();
        assert!(matches!(AccConfig::load(&paths), Err(AccError::Parse { .. })));
    }
}
