//! CLI handler for reconciliation

use std::path::PathBuf;

use clap::Args;

use super::{load_gated, save_repository, GlobalOptions};
use crate::display::format_reconciliation_summary;
use crate::error::AccResult;
use crate::events::TracingSink;
use crate::models::FlawLevel;
use crate::services::ReconciliationService;

#[derive(Debug, Clone, Args)]
pub struct ReconcileArgs {
    /// Save the repository into this folder instead of in place
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only print what would be linked
    #[arg(long)]
    pub dry_run: bool,
}

/// Link transactions to their documents and save the result
pub fn handle_reconcile_command(options: &GlobalOptions, args: &ReconcileArgs) -> AccResult<()> {
    let storage = options.storage()?;
    let (repo, _) = load_gated(&storage, "reconcile", FlawLevel::BeforeMerge, options.force)?;

    let (mut repo, summary) = ReconciliationService::new(&TracingSink).reconcile(repo);
    print!("{}", format_reconciliation_summary(&summary));

    if args.dry_run {
        println!("Dry run, nothing saved.");
        return Ok(());
    }
    save_repository(&storage, args.output.as_deref(), &mut repo)
}
