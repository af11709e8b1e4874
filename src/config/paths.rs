//! Path management for acc repositories
//!
//! A repository is a folder holding `acc.yaml` and the collection files it
//! points to. In project layout, customers and projects live in
//! `projects/<customer>/<project>/` and internal expenses in `internal/`.
//!
//! ## Root Resolution Order
//!
//! 1. An explicit input (the `acc.yaml` file or its folder)
//! 2. `ACC_REPOSITORY` environment variable (if set)
//! 3. The current working directory

use std::path::{Path, PathBuf};

use crate::error::{AccError, AccResult};

/// Environment variable overriding the repository folder
pub const REPOSITORY_ENV: &str = "ACC_REPOSITORY";

/// File name of the main configuration
pub const CONFIG_FILE_NAME: &str = "acc.yaml";

/// Manages all paths of one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryPaths {
    root: PathBuf,
    config_file: PathBuf,
}

impl RepositoryPaths {
    /// Resolve the repository from `ACC_REPOSITORY` or the working directory
    pub fn new() -> AccResult<Self> {
        let root = match std::env::var(REPOSITORY_ENV) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => std::env::current_dir().map_err(|e| {
                AccError::Config(format!("Could not determine working directory: {}", e))
            })?,
        };
        Ok(Self::with_base_dir(root))
    }

    /// Resolve from an explicit input, falling back to [`RepositoryPaths::new`]
    pub fn resolve(input: Option<&Path>) -> AccResult<Self> {
        match input {
            Some(path) => Ok(Self::from_input(path)),
            None => Self::new(),
        }
    }

    /// Use a config file path or a repository folder
    pub fn from_input(input: &Path) -> Self {
        let is_config_file = input
            .extension()
            .map(|ext| ext == "yaml" || ext == "yml")
            .unwrap_or(false);
        if is_config_file {
            let root = input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let root = if root.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                root
            };
            Self {
                root,
                config_file: input.to_path_buf(),
            }
        } else {
            Self::with_base_dir(input.to_path_buf())
        }
    }

    /// Create paths for a given repository folder (useful for testing)
    pub fn with_base_dir(root: PathBuf) -> Self {
        let config_file = root.join(CONFIG_FILE_NAME);
        Self { root, config_file }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Resolve a path from the config relative to the repository root
    pub fn resolve_file(&self, relative: &str) -> PathBuf {
        let path = Path::new(relative);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// `projects/`
    pub fn projects_dir(&self) -> PathBuf {
        self.root.join("projects")
    }

    /// `internal/`
    pub fn internal_dir(&self) -> PathBuf {
        self.root.join("internal")
    }

    /// `employees.yaml`
    pub fn employees_file(&self) -> PathBuf {
        self.root.join("employees.yaml")
    }

    /// `projects/<customer>/`
    pub fn customer_dir(&self, customer_name: &str) -> PathBuf {
        self.projects_dir().join(folder_name(customer_name))
    }

    /// `projects/<customer>/customer.yaml`
    pub fn customer_file(&self, customer_name: &str) -> PathBuf {
        self.customer_dir(customer_name).join("customer.yaml")
    }

    /// `projects/<customer>/<project>/project.yaml`
    pub fn project_file(&self, customer_name: &str, project_name: &str) -> PathBuf {
        self.customer_dir(customer_name)
            .join(folder_name(project_name))
            .join("project.yaml")
    }

    /// `internal/expenses-<year>.yaml`, or `internal/expenses-other.yaml`
    pub fn internal_expenses_file(&self, year: Option<i32>) -> PathBuf {
        match year {
            Some(year) => self.internal_dir().join(format!("expenses-{}.yaml", year)),
            None => self.internal_dir().join("expenses-other.yaml"),
        }
    }

    /// `internal/invoices-other.yaml`, for invoices without a project
    pub fn internal_invoices_file(&self) -> PathBuf {
        self.internal_dir().join("invoices-other.yaml")
    }

    /// Check if the repository has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.config_file.exists()
    }
}

/// Turn a customer or project name into a folder name.
///
/// Lowercases, transliterates German umlauts and replaces spaces, dots,
/// underscores and slashes with dashes.
pub fn folder_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    for c in name.trim().chars().flat_map(char::to_lowercase) {
        match c {
            'ä' => result.push_str("ae"),
            'ö' => result.push_str("oe"),
            'ü' => result.push_str("ue"),
            ' ' | '_' | '.' | '/' | '\\' => result.push('-'),
            other => result.push(other),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = RepositoryPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.root(), temp_dir.path());
        assert_eq!(paths.config_file(), temp_dir.path().join("acc.yaml"));
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_from_config_file_input() {
        let paths = RepositoryPaths::from_input(Path::new("/data/books/acc.yaml"));
        assert_eq!(paths.root(), Path::new("/data/books"));
        assert_eq!(paths.config_file(), Path::new("/data/books/acc.yaml"));

        let bare = RepositoryPaths::from_input(Path::new("acc.yaml"));
        assert_eq!(bare.root(), Path::new("."));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        env::set_var(REPOSITORY_ENV, temp_dir.path());

        let paths = RepositoryPaths::resolve(None).unwrap();
        assert_eq!(paths.root(), temp_dir.path());

        env::remove_var(REPOSITORY_ENV);
    }

    #[test]
    fn test_project_layout_paths() {
        let paths = RepositoryPaths::with_base_dir(PathBuf::from("/repo"));
        assert_eq!(
            paths.project_file("Müller AG", "Web Site 2.0"),
            PathBuf::from("/repo/projects/mueller-ag/web-site-2-0/project.yaml")
        );
        assert_eq!(
            paths.internal_expenses_file(Some(2021)),
            PathBuf::from("/repo/internal/expenses-2021.yaml")
        );
        assert_eq!(
            paths.internal_expenses_file(None),
            PathBuf::from("/repo/internal/expenses-other.yaml")
        );
    }

    #[test]
    fn test_resolve_file() {
        let paths = RepositoryPaths::with_base_dir(PathBuf::from("/repo"));
        assert_eq!(paths.resolve_file("expenses.yaml"), PathBuf::from("/repo/expenses.yaml"));
        assert_eq!(paths.resolve_file("/abs/x.yaml"), PathBuf::from("/abs/x.yaml"));
    }

    #[test]
    fn test_folder_name() {
        assert_eq!(folder_name("Große Übung_2.0"), "große-uebung-2-0");
        assert_eq!(folder_name("ACME Corp"), "acme-corp");
    }
}
