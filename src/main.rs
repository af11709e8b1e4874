use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use acc::cli::{
    handle_filter_command, handle_import_command, handle_init_command, handle_journal_command,
    handle_reconcile_command, handle_validate_command, FilterArgs, GlobalOptions, ImportArgs,
    InitArgs, JournalArgs, ReconcileArgs, ValidateArgs,
};
use acc::config::REPOSITORY_ENV;

#[derive(Parser)]
#[command(
    name = "acc",
    version,
    about = "Plain-text accounting assistant",
    long_about = "acc keeps expenses, invoices, bank statements, customers and \
                  projects in YAML files, validates them, links bank transactions \
                  to the documents that caused them and writes an hledger journal."
)]
struct Cli {
    /// acc.yaml or the repository folder
    #[arg(short, long, global = true, env = REPOSITORY_ENV)]
    input: Option<PathBuf>,

    /// More output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Run even when validation flaws would block the command
    #[arg(long, global = true)]
    force: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the repository and print the validation report
    Validate(ValidateArgs),

    /// Import transactions from a bank CSV export
    Import(ImportArgs),

    /// Link transactions to expenses, invoices and misc records
    #[command(alias = "merge")]
    Reconcile(ReconcileArgs),

    /// Write the hledger journal
    Journal(JournalArgs),

    /// Select records by date, identifier and kind
    Filter(FilterArgs),

    /// Create a new repository
    Init(InitArgs),
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = GlobalOptions {
        input: cli.input,
        force: cli.force,
    };

    match &cli.command {
        Commands::Validate(args) => handle_validate_command(&options, args)?,
        Commands::Import(args) => handle_import_command(&options, args)?,
        Commands::Reconcile(args) => handle_reconcile_command(&options, args)?,
        Commands::Journal(args) => handle_journal_command(&options, args)?,
        Commands::Filter(args) => handle_filter_command(&options, args)?,
        Commands::Init(args) => handle_init_command(&options, args)?,
    }
    Ok(())
}
