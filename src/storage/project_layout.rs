//! Project layout: a folder per customer and per project
//!
//! ```text
//! acc.yaml
//! employees.yaml
//! misc.yaml, statement.yaml          (paths from acc.yaml)
//! projects/<customer>/customer.yaml
//! projects/<customer>/<project>/project.yaml
//! internal/expenses-<year>.yaml
//! internal/expenses-other.yaml
//! internal/invoices-other.yaml
//! ```
//!
//! Attachment paths inside a project bundle are relative to the project
//! folder on disk and absolute in memory.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::thread;

use chrono::Datelike;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{AccConfig, RepositoryPaths};
use crate::error::{AccError, AccResult};
use crate::models::{Expense, Invoice, MiscRecord, Party, Project, ProjectId, Statement};

use super::file_io::{read_yaml, read_yaml_required, to_yaml_string, Hashed};
use super::repository::Repository;
use super::resolve::RepositoryIndex;
use super::{ensure_unique_ids, Loaded};

/// One project together with its documents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub project: Project,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
}

re!(internal_file_pattern, r"^(expenses-(2\d{3}|other)|invoices-other)\.yaml$");

/// Files found on disk, grouped by what they contain
#[derive(Debug, Default)]
struct Discovered {
    customers: Vec<PathBuf>,
    projects: Vec<PathBuf>,
    internal_expenses: Vec<PathBuf>,
    orphan_invoices: Vec<PathBuf>,
}

fn sorted_entries(dir: &Path) -> AccResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut entries = fs::read_dir(dir)
        .map_err(|e| AccError::Storage(format!("Failed to list {}: {}", dir.display(), e)))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect::<Vec<_>>();
    entries.sort();
    Ok(entries)
}

fn discover(paths: &RepositoryPaths) -> AccResult<Discovered> {
    let mut found = Discovered::default();

    for customer_dir in sorted_entries(&paths.projects_dir())? {
        if !customer_dir.is_dir() {
            continue;
        }
        let customer_file = customer_dir.join("customer.yaml");
        if customer_file.is_file() {
            found.customers.push(customer_file);
        }
        for project_dir in sorted_entries(&customer_dir)? {
            let project_file = project_dir.join("project.yaml");
            if project_dir.is_dir() && project_file.is_file() {
                found.projects.push(project_file);
            }
        }
    }

    for file in sorted_entries(&paths.internal_dir())? {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !internal_file_pattern().is_match(&name) {
            continue;
        }
        if name.starts_with("invoices") {
            found.orphan_invoices.push(file);
        } else {
            found.internal_expenses.push(file);
        }
    }

    Ok(found)
}

/// Per-collection results of the concurrent read
struct Gathered {
    customers: Mutex<Vec<(PathBuf, Party)>>,
    projects: Mutex<Vec<(PathBuf, ProjectFile)>>,
    internal_expenses: Mutex<Vec<(PathBuf, Vec<Expense>)>>,
    orphan_invoices: Mutex<Vec<(PathBuf, Vec<Invoice>)>>,
    hashes: Mutex<Vec<(PathBuf, String)>>,
    errors: Mutex<Vec<(PathBuf, AccError)>>,
}

fn push<T>(collection: &Mutex<Vec<T>>, value: T) {
    match collection.lock() {
        Ok(mut items) => items.push(value),
        Err(poisoned) => poisoned.into_inner().push(value),
    }
}

fn take_sorted<T>(collection: Mutex<Vec<(PathBuf, T)>>) -> Vec<(PathBuf, T)> {
    let mut items = match collection.into_inner() {
        Ok(items) => items,
        Err(poisoned) => poisoned.into_inner(),
    };
    items.sort_by(|a, b| a.0.cmp(&b.0));
    items
}

impl Gathered {
    fn new() -> Self {
        Self {
            customers: Mutex::new(Vec::new()),
            projects: Mutex::new(Vec::new()),
            internal_expenses: Mutex::new(Vec::new()),
            orphan_invoices: Mutex::new(Vec::new()),
            hashes: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        }
    }

    fn read_into<T>(&self, path: &Path, target: &Mutex<Vec<(PathBuf, T)>>)
    where
        T: serde::de::DeserializeOwned + Default,
    {
        match read_yaml_required::<T, _>(path) {
            Ok(Hashed { value, hash }) => {
                if let Some(hash) = hash {
                    push(&self.hashes, (path.to_path_buf(), hash));
                }
                push(target, (path.to_path_buf(), value));
            }
            Err(err) => push(&self.errors, (path.to_path_buf(), err)),
        }
    }
}

fn absolutize(path: &mut String, dir: &Path) {
    if path.trim().is_empty() || Path::new(path.as_str()).is_absolute() {
        return;
    }
    *path = dir.join(path.as_str()).to_string_lossy().into_owned();
}

fn relativize(path: &mut String, dir: &Path) {
    if let Ok(relative) = Path::new(path.as_str()).strip_prefix(dir) {
        *path = relative.to_string_lossy().into_owned();
    }
}

fn read_single<T>(path: &Path, hashes: &mut Vec<(PathBuf, String)>) -> AccResult<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    let Hashed { value, hash } = read_yaml::<T, _>(path)?;
    if let Some(hash) = hash {
        hashes.push((path.to_path_buf(), hash));
    }
    Ok(value)
}

/// Discover and read every file of the layout, one reader per file
pub fn load(paths: &RepositoryPaths, config: AccConfig) -> AccResult<Loaded> {
    let found = discover(paths)?;
    let gathered = Gathered::new();

    thread::scope(|s| {
        for path in &found.customers {
            s.spawn(|| gathered.read_into(path, &gathered.customers));
        }
        for path in &found.projects {
            s.spawn(|| gathered.read_into(path, &gathered.projects));
        }
        for path in &found.internal_expenses {
            s.spawn(|| gathered.read_into(path, &gathered.internal_expenses));
        }
        for path in &found.orphan_invoices {
            s.spawn(|| gathered.read_into(path, &gathered.orphan_invoices));
        }
    });

    let Gathered {
        customers,
        projects,
        internal_expenses,
        orphan_invoices,
        hashes,
        errors,
    } = gathered;

    if let Some((_, err)) = take_sorted(errors).into_iter().next() {
        return Err(err);
    }

    let mut hashes = match hashes.into_inner() {
        Ok(hashes) => hashes,
        Err(poisoned) => poisoned.into_inner(),
    };

    let employees_path = paths.employees_file();
    let misc_path = paths.resolve_file(&config.files.misc);
    let statement_path = paths.resolve_file(&config.files.statement);
    let employees: Vec<Party> = read_single(&employees_path, &mut hashes)?;
    let misc: Vec<MiscRecord> = read_single(&misc_path, &mut hashes)?;
    let statement: Statement = read_single(&statement_path, &mut hashes)?;
    hashes.sort();

    let customers = take_sorted(customers);
    let projects = take_sorted(projects);
    let internal_expenses = take_sorted(internal_expenses);
    let orphan_invoices = take_sorted(orphan_invoices);

    let mut expense_origins: Vec<(PathBuf, Expense)> = Vec::new();
    let mut invoice_origins: Vec<(PathBuf, Invoice)> = Vec::new();
    let mut project_list = Vec::with_capacity(projects.len());
    let mut project_origins = Vec::with_capacity(projects.len());

    for (path, bundle) in projects {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        for mut exp in bundle.expenses {
            absolutize(&mut exp.path, &dir);
            expense_origins.push((path.clone(), exp));
        }
        for mut inv in bundle.invoices {
            absolutize(&mut inv.path, &dir);
            invoice_origins.push((path.clone(), inv));
        }
        project_origins.push((path, bundle.project.id.clone()));
        project_list.push(bundle.project);
    }
    for (path, expenses) in internal_expenses {
        expense_origins.extend(expenses.into_iter().map(|e| (path.clone(), e)));
    }
    for (path, invoices) in orphan_invoices {
        invoice_origins.extend(invoices.into_iter().map(|i| (path.clone(), i)));
    }

    ensure_unique_ids(
        "Customer",
        customers.iter().map(|(p, c)| (p.as_path(), c.id.as_str())),
    )?;
    ensure_unique_ids(
        "Project",
        project_origins.iter().map(|(p, id)| (p.as_path(), id.as_str())),
    )?;
    ensure_unique_ids(
        "Expense",
        expense_origins.iter().map(|(p, e)| (p.as_path(), e.id.as_str())),
    )?;
    ensure_unique_ids(
        "Invoice",
        invoice_origins.iter().map(|(p, i)| (p.as_path(), i.id.as_str())),
    )?;
    ensure_unique_ids(
        "Employee",
        employees.iter().map(|e| (employees_path.as_path(), e.id.as_str())),
    )?;
    ensure_unique_ids(
        "Misc",
        misc.iter().map(|m| (misc_path.as_path(), m.id.as_str())),
    )?;
    ensure_unique_ids(
        "Transaction",
        statement
            .transactions
            .iter()
            .map(|t| (statement_path.as_path(), t.id.as_str())),
    )?;

    let mut repository = Repository {
        config,
        expenses: expense_origins.into_iter().map(|(_, e)| e).collect(),
        invoices: invoice_origins.into_iter().map(|(_, i)| i).collect(),
        misc,
        customers: customers.into_iter().map(|(_, c)| c).collect(),
        employees,
        projects: project_list,
        statement,
    };
    repository.normalize_party_kinds();
    arrange(&mut repository, paths);

    Ok(Loaded { repository, hashes })
}

/// Folder name used for projects whose customer cannot be resolved
const NO_CUSTOMER: &str = "no customer";

fn claim(claimed: &mut HashMap<PathBuf, String>, path: &Path, owner: String) -> AccResult<()> {
    if let Some(previous) = claimed.insert(path.to_path_buf(), owner.clone()) {
        return Err(AccError::Storage(format!(
            "{} and {} would both be saved to {}",
            previous,
            owner,
            path.display()
        )));
    }
    Ok(())
}

/// Which file a save puts an expense or invoice into
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
    Bundle(PathBuf),
    Internal(PathBuf),
}

fn project_path(index: &RepositoryIndex<'_>, project: &Project, paths: &RepositoryPaths) -> PathBuf {
    let customer_name = index
        .customer(&project.customer_id)
        .map(|c| c.name.as_str())
        .unwrap_or(NO_CUSTOMER);
    paths.project_file(customer_name, &project.name)
}

/// Bundle file per project Id; the first project with an Id owns it
fn bundle_paths(
    repo: &Repository,
    index: &RepositoryIndex<'_>,
    paths: &RepositoryPaths,
) -> HashMap<ProjectId, PathBuf> {
    let mut bundles = HashMap::new();
    for project in &repo.projects {
        bundles
            .entry(project.id.clone())
            .or_insert_with(|| project_path(index, project, paths));
    }
    bundles
}

fn expense_slot(exp: &Expense, bundles: &HashMap<ProjectId, PathBuf>, paths: &RepositoryPaths) -> Slot {
    if !exp.internal {
        if let Some(path) = bundles.get(&exp.project_id) {
            return Slot::Bundle(path.clone());
        }
    }
    // Only years the loader discovers get a file of their own
    let year = exp
        .date_of_accrual
        .map(|d| d.year())
        .filter(|year| exp.internal && (2000..3000).contains(year));
    Slot::Internal(paths.internal_expenses_file(year))
}

fn invoice_slot(inv: &Invoice, bundles: &HashMap<ProjectId, PathBuf>, paths: &RepositoryPaths) -> Slot {
    match bundles.get(&inv.project_id) {
        Some(path) => Slot::Bundle(path.clone()),
        None => Slot::Internal(paths.internal_invoices_file()),
    }
}

/// Stable sort of `items` by the key computed for each position
fn sort_by_keys<T, K: Ord>(items: &mut Vec<T>, keys: Vec<K>) {
    let mut keyed: Vec<(K, T)> = keys.into_iter().zip(items.drain(..)).collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    items.extend(keyed.into_iter().map(|(_, item)| item));
}

/// Put the collections in the order a load of this layout reads them back.
///
/// Customers and projects follow their file paths. Expenses and invoices
/// come bundle by bundle, then from the internal files. Entities sharing a
/// file keep their relative order, so the saved files do not change.
pub fn arrange(repo: &mut Repository, paths: &RepositoryPaths) {
    let index = repo.index();
    let bundles = bundle_paths(repo, &index, paths);
    let customer_keys: Vec<PathBuf> = repo
        .customers
        .iter()
        .map(|c| paths.customer_file(&c.name))
        .collect();
    let project_keys: Vec<PathBuf> = repo
        .projects
        .iter()
        .map(|p| project_path(&index, p, paths))
        .collect();
    let expense_keys: Vec<Slot> = repo
        .expenses
        .iter()
        .map(|e| expense_slot(e, &bundles, paths))
        .collect();
    let invoice_keys: Vec<Slot> = repo
        .invoices
        .iter()
        .map(|i| invoice_slot(i, &bundles, paths))
        .collect();

    sort_by_keys(&mut repo.customers, customer_keys);
    sort_by_keys(&mut repo.projects, project_keys);
    sort_by_keys(&mut repo.expenses, expense_keys);
    sort_by_keys(&mut repo.invoices, invoice_keys);
}

/// The files and contents a save of this repository produces
pub fn plan(repo: &Repository, paths: &RepositoryPaths) -> AccResult<Vec<(PathBuf, String)>> {
    let index = repo.index();
    let bundles = bundle_paths(repo, &index, paths);
    let mut files = Vec::new();
    let mut claimed = HashMap::new();

    files.push((paths.employees_file(), to_yaml_string(&repo.employees)?));

    for customer in &repo.customers {
        let path = paths.customer_file(&customer.name);
        claim(&mut claimed, &path, format!("customer {}", customer.short_label()))?;
        files.push((path, to_yaml_string(customer)?));
    }

    let expense_slots: Vec<Slot> = repo
        .expenses
        .iter()
        .map(|e| expense_slot(e, &bundles, paths))
        .collect();
    let invoice_slots: Vec<Slot> = repo
        .invoices
        .iter()
        .map(|i| invoice_slot(i, &bundles, paths))
        .collect();

    for project in &repo.projects {
        let path = project_path(&index, project, paths);
        claim(&mut claimed, &path, format!("project {}", project.identifier))?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let own = Slot::Bundle(path.clone());

        let mut bundle = ProjectFile {
            project: project.clone(),
            ..Default::default()
        };
        for (exp, slot) in repo.expenses.iter().zip(&expense_slots) {
            if *slot == own {
                let mut exp = exp.clone();
                relativize(&mut exp.path, &dir);
                bundle.expenses.push(exp);
            }
        }
        for (inv, slot) in repo.invoices.iter().zip(&invoice_slots) {
            if *slot == own {
                let mut inv = inv.clone();
                relativize(&mut inv.path, &dir);
                bundle.invoices.push(inv);
            }
        }
        files.push((path, to_yaml_string(&bundle)?));
    }

    let mut internal: BTreeMap<&Path, Vec<&Expense>> = BTreeMap::new();
    for (exp, slot) in repo.expenses.iter().zip(&expense_slots) {
        if let Slot::Internal(path) = slot {
            internal.entry(path.as_path()).or_default().push(exp);
        }
    }
    for (path, expenses) in internal {
        files.push((path.to_path_buf(), to_yaml_string(&expenses)?));
    }

    let orphans: Vec<&Invoice> = repo
        .invoices
        .iter()
        .zip(&invoice_slots)
        .filter(|(_, slot)| matches!(slot, Slot::Internal(_)))
        .map(|(inv, _)| inv)
        .collect();
    if !orphans.is_empty() {
        files.push((paths.internal_invoices_file(), to_yaml_string(&orphans)?));
    }

    files.push((paths.resolve_file(&repo.config.files.misc), to_yaml_string(&repo.misc)?));
    files.push((
        paths.resolve_file(&repo.config.files.statement),
        to_yaml_string(&repo.statement)?,
    ));

    Ok(files)
}

/// Whether a file belongs to the generated part of the layout and may be
/// removed when a save no longer produces it
pub fn is_managed(path: &Path, paths: &RepositoryPaths) -> bool {
    path.starts_with(paths.projects_dir()) || path.starts_with(paths.internal_dir())
}
