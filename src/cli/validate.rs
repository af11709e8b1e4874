//! CLI handler for the validation report

use std::path::PathBuf;

use clap::Args;

use super::{write_output, GlobalOptions};
use crate::display::format_validation_report;
use crate::error::{AccError, AccResult};
use crate::events::TracingSink;
use crate::models::FlawLevel;
use crate::services::ValidationService;

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print the report; fails when fundamental flaws are present
pub fn handle_validate_command(options: &GlobalOptions, args: &ValidateArgs) -> AccResult<()> {
    let storage = options.storage()?;
    let repo = storage.load()?;
    let report = ValidationService::new(&repo).validate(&TracingSink);

    write_output(args.output.as_deref(), &format_validation_report(&report))?;
    if let Some(path) = &args.output {
        println!("Validation report written to {}", path.display());
    }

    let fundamental = report.blocking(FlawLevel::Fundamental).count();
    if fundamental > 0 {
        return Err(AccError::Validation(format!(
            "{} fundamental flaw(s) found",
            fundamental
        )));
    }
    Ok(())
}
