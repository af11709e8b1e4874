//! CLI command handler for CSV import
//!
//! Reads a bank export, appends the new transactions to the statement and
//! saves the repository.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use csv::ReaderBuilder;

use super::{load_gated, save_repository, GlobalOptions};
use crate::display::format_import_summary;
use crate::error::{AccError, AccResult};
use crate::events::TracingSink;
use crate::models::FlawLevel;
use crate::services::{ColumnMapping, CsvImporter, ImportService};

/// How the CSV columns are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MappingPreset {
    /// Guess from the header row
    Detect,
    /// `date,amount,description` with ISO dates
    Generic,
    /// Swiss e-banking export: `Date;Text;Debit;Credit;Reference`
    Swiss,
}

#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    /// Path to the CSV export
    pub file: PathBuf,

    /// Column layout of the export
    #[arg(short, long, value_enum, default_value = "detect")]
    pub mapping: MappingPreset,

    /// Date format of the export, e.g. %d.%m.%Y
    #[arg(long)]
    pub date_format: Option<String>,

    /// Field delimiter
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Save the repository into this folder instead of in place
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ImportArgs {
    fn column_mapping(&self) -> AccResult<ColumnMapping> {
        let mut mapping = match self.mapping {
            MappingPreset::Generic => ColumnMapping::new(),
            MappingPreset::Swiss => ColumnMapping::swiss_bank(),
            MappingPreset::Detect => {
                let delimiter = self.delimiter.unwrap_or(',');
                let mut reader = ReaderBuilder::new()
                    .delimiter(delimiter as u8)
                    .from_path(&self.file)
                    .map_err(|e| {
                        AccError::Import(format!("Failed to open {}: {}", self.file.display(), e))
                    })?;
                let headers = reader.headers()?.clone();
                ColumnMapping::detect(&headers).with_delimiter(delimiter)
            }
        };
        if let Some(format) = &self.date_format {
            mapping = mapping.with_date_format(format);
        }
        if let Some(delimiter) = self.delimiter {
            mapping = mapping.with_delimiter(delimiter);
        }
        Ok(mapping)
    }
}

/// Handle the import command
pub fn handle_import_command(options: &GlobalOptions, args: &ImportArgs) -> AccResult<()> {
    if !args.file.exists() {
        return Err(AccError::Import(format!(
            "File not found: {}",
            args.file.display()
        )));
    }

    let storage = options.storage()?;
    let (mut repo, _) = load_gated(&storage, "import", FlawLevel::BeforeImport, options.force)?;

    let mapping = args.column_mapping()?;
    let mut importer = CsvImporter::from_path(&args.file, mapping, repo.currency())?;
    let summary = ImportService::new(&TracingSink).import(&mut repo, &mut importer)?;

    print!("{}", format_import_summary(&summary));
    if summary.imported > 0 {
        save_repository(&storage, args.output.as_deref(), &mut repo)?;
    }
    Ok(())
}
