//! CLI handler for filtering records

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, ValueEnum};

use super::{load_gated, write_output, GlobalOptions};
use crate::error::{AccError, AccResult};
use crate::models::FlawLevel;
use crate::services::{select, sort_by_date, FilterCriteria, RecordKind};
use crate::storage::file_io::to_yaml_string;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// First day to keep (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day to keep (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Keep one calendar year; conflicts with --from and --to
    #[arg(short, long, conflicts_with_all = ["from", "to"])]
    pub year: Option<i32>,

    /// Regular expression the identifier has to match
    #[arg(long)]
    pub identifier: Option<String>,

    /// Record kinds to keep, comma separated (expense, invoice, misc, transaction)
    #[arg(short, long, value_delimiter = ',')]
    pub kinds: Vec<RecordKind>,

    /// Sort every collection by date
    #[arg(long)]
    pub sort: bool,

    #[arg(short, long, value_enum, default_value = "yaml")]
    pub format: OutputFormat,

    /// Write the selection to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl FilterArgs {
    fn criteria(&self) -> AccResult<FilterCriteria> {
        let mut criteria = match self.year {
            Some(year) => FilterCriteria::year(year),
            None => FilterCriteria::new().with_range(self.from, self.to),
        };
        if let Some(pattern) = &self.identifier {
            criteria = criteria.with_identifier(pattern)?;
        }
        Ok(criteria.with_kinds(self.kinds.clone()))
    }
}

pub fn handle_filter_command(options: &GlobalOptions, args: &FilterArgs) -> AccResult<()> {
    if let (Some(from), Some(to)) = (args.from, args.to) {
        if from > to {
            return Err(AccError::Validation(format!(
                "--from {} lies after --to {}",
                from, to
            )));
        }
    }

    let storage = options.storage()?;
    let (repo, _) = load_gated(&storage, "filter", FlawLevel::Fundamental, options.force)?;

    let mut selection = select(&repo, &args.criteria()?);
    if args.sort {
        sort_by_date(&mut selection);
    }
    tracing::info!(records = selection.len(), "filter applied");

    let text = match args.format {
        OutputFormat::Yaml => to_yaml_string(&selection)?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&selection)?;
            json.push('\n');
            json
        }
    };
    write_output(args.output.as_deref(), &text)
}
