//! CLI handler for journal generation

use std::path::PathBuf;

use clap::Args;

use super::{load_gated, write_output, GlobalOptions};
use crate::display::format_journal_summary;
use crate::error::AccResult;
use crate::events::TracingSink;
use crate::journal::Journal;
use crate::models::FlawLevel;

#[derive(Debug, Clone, Args)]
pub struct JournalArgs {
    /// Write the journal to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep only entries dated in this year
    #[arg(short, long)]
    pub year: Option<i32>,
}

/// Build the journal and write it out
pub fn handle_journal_command(options: &GlobalOptions, args: &JournalArgs) -> AccResult<()> {
    let storage = options.storage()?;
    let (repo, _) = load_gated(
        &storage,
        "export the journal",
        FlawLevel::BeforeExport,
        options.force,
    )?;

    let mut journal = Journal::from_repository(&repo, &TracingSink);
    if let Some(year) = args.year {
        journal.retain_year(year);
    }

    write_output(args.output.as_deref(), &journal.render())?;
    if let Some(path) = &args.output {
        print!("{}", format_journal_summary(&journal));
        println!("Journal written to {}", path.display());
    }
    Ok(())
}
