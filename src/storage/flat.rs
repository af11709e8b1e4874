//! Flat layout: one file per collection next to `acc.yaml`

use std::path::PathBuf;
use std::thread;

use serde::{Deserialize, Serialize};

use crate::config::{AccConfig, RepositoryPaths};
use crate::error::AccResult;
use crate::models::{Expense, Invoice, MiscRecord, Party, Project, Statement};

use super::file_io::{read_yaml, to_yaml_string, Hashed};
use super::repository::Repository;
use super::{ensure_unique_ids, join_reader, Loaded};

/// Customers and employees share one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartiesFile {
    #[serde(default)]
    pub customers: Vec<Party>,
    #[serde(default)]
    pub employees: Vec<Party>,
}

fn record_hash<T>(hashes: &mut Vec<(PathBuf, String)>, path: &PathBuf, file: &Hashed<T>) {
    if let Some(hash) = &file.hash {
        hashes.push((path.clone(), hash.clone()));
    }
}

/// Read all collection files concurrently, one reader per file
pub fn load(paths: &RepositoryPaths, config: AccConfig) -> AccResult<Loaded> {
    let files = &config.files;
    let expenses_path = paths.resolve_file(&files.expenses);
    let invoices_path = paths.resolve_file(&files.invoices);
    let misc_path = paths.resolve_file(&files.misc);
    let parties_path = paths.resolve_file(&files.parties);
    let projects_path = paths.resolve_file(&files.projects);
    let statement_path = paths.resolve_file(&files.statement);

    let (expenses, invoices, misc, parties, projects, statement) = thread::scope(|s| {
        let expenses = s.spawn(|| read_yaml::<Vec<Expense>, _>(&expenses_path));
        let invoices = s.spawn(|| read_yaml::<Vec<Invoice>, _>(&invoices_path));
        let misc = s.spawn(|| read_yaml::<Vec<MiscRecord>, _>(&misc_path));
        let parties = s.spawn(|| read_yaml::<PartiesFile, _>(&parties_path));
        let projects = s.spawn(|| read_yaml::<Vec<Project>, _>(&projects_path));
        let statement = s.spawn(|| read_yaml::<Statement, _>(&statement_path));
        (
            join_reader(expenses),
            join_reader(invoices),
            join_reader(misc),
            join_reader(parties),
            join_reader(projects),
            join_reader(statement),
        )
    });
    let (expenses, invoices, misc) = (expenses?, invoices?, misc?);
    let (parties, projects, statement) = (parties?, projects?, statement?);

    let mut hashes = Vec::new();
    record_hash(&mut hashes, &expenses_path, &expenses);
    record_hash(&mut hashes, &invoices_path, &invoices);
    record_hash(&mut hashes, &misc_path, &misc);
    record_hash(&mut hashes, &parties_path, &parties);
    record_hash(&mut hashes, &projects_path, &projects);
    record_hash(&mut hashes, &statement_path, &statement);

    ensure_unique_ids(
        "Expense",
        expenses.value.iter().map(|e| (expenses_path.as_path(), e.id.as_str())),
    )?;
    ensure_unique_ids(
        "Invoice",
        invoices.value.iter().map(|i| (invoices_path.as_path(), i.id.as_str())),
    )?;
    ensure_unique_ids(
        "Misc",
        misc.value.iter().map(|m| (misc_path.as_path(), m.id.as_str())),
    )?;
    ensure_unique_ids(
        "Customer",
        parties.value.customers.iter().map(|p| (parties_path.as_path(), p.id.as_str())),
    )?;
    ensure_unique_ids(
        "Employee",
        parties.value.employees.iter().map(|p| (parties_path.as_path(), p.id.as_str())),
    )?;
    ensure_unique_ids(
        "Project",
        projects.value.iter().map(|p| (projects_path.as_path(), p.id.as_str())),
    )?;
    ensure_unique_ids(
        "Transaction",
        statement
            .value
            .transactions
            .iter()
            .map(|t| (statement_path.as_path(), t.id.as_str())),
    )?;

    let mut repository = Repository {
        config,
        expenses: expenses.value,
        invoices: invoices.value,
        misc: misc.value,
        customers: parties.value.customers,
        employees: parties.value.employees,
        projects: projects.value,
        statement: statement.value,
    };
    repository.normalize_party_kinds();

    Ok(Loaded { repository, hashes })
}

/// The files and contents a save of this repository produces
pub fn plan(repo: &Repository, paths: &RepositoryPaths) -> AccResult<Vec<(PathBuf, String)>> {
    let files = &repo.config.files;
    let parties = PartiesFile {
        customers: repo.customers.clone(),
        employees: repo.employees.clone(),
    };
    Ok(vec![
        (paths.resolve_file(&files.expenses), to_yaml_string(&repo.expenses)?),
        (paths.resolve_file(&files.invoices), to_yaml_string(&repo.invoices)?),
        (paths.resolve_file(&files.misc), to_yaml_string(&repo.misc)?),
        (paths.resolve_file(&files.parties), to_yaml_string(&parties)?),
        (paths.resolve_file(&files.projects), to_yaml_string(&repo.projects)?),
        (paths.resolve_file(&files.statement), to_yaml_string(&repo.statement)?),
    ])
}
