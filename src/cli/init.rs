//! CLI handler for creating a new repository

use clap::Args;

use super::GlobalOptions;
use crate::error::AccResult;

#[derive(Debug, Clone, Args)]
pub struct InitArgs {
    /// Lay the repository out as one folder per customer and project
    #[arg(long)]
    pub project_mode: bool,
}

pub fn handle_init_command(options: &GlobalOptions, args: &InitArgs) -> AccResult<()> {
    let storage = options.storage()?;
    storage.init(args.project_mode)?;

    let paths = storage.paths();
    println!("Initialized acc repository at: {}", paths.root().display());
    println!("Configuration: {}", paths.config_file().display());
    if args.project_mode {
        println!("Customers and projects go into {}", paths.projects_dir().display());
    }
    Ok(())
}
