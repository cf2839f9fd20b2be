use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use splitledger::cli::{
    handle_add_command, handle_delete_command, handle_edit_command, handle_export_command,
    handle_history_command, handle_scan_command, handle_settle_command, AddArgs, DeleteArgs,
    EditArgs, ExportArgs, HistoryArgs, ScanArgs, Session,
};
use splitledger::config::{LedgerPaths, Settings};
use splitledger::storage::init::{initialize_storage, needs_initialization};
use splitledger::LedgerError;

/// Environment variable holding the log filter
const LOG_ENV: &str = "SPLITLEDGER_LOG";

#[derive(Parser)]
#[command(
    name = "splitledger",
    version,
    about = "Two-party shared expense ledger",
    long_about = "splitledger records receipts for two people in a plain text ledger, \
                  converts them once to a base currency and works out who owes whom."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory, settings and an empty ledger
    Init,

    /// Show current configuration and paths
    Config,

    /// Record an expense entered by hand
    Add(AddArgs),

    /// Record an expense from a saved receipt extraction reply
    Scan(ScanArgs),

    /// Show recorded expenses, newest first
    #[command(alias = "list")]
    History(HistoryArgs),

    /// Show totals and who owes whom
    Settle,

    /// Change one expense
    Edit(EditArgs),

    /// Remove one expense
    #[command(alias = "rm")]
    Delete(DeleteArgs),

    /// Export the ledger
    Export(ExportArgs),
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        if let Some(hint) = err.downcast_ref::<LedgerError>().and_then(LedgerError::hint) {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = LedgerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing splitledger at: {}", paths.base_dir().display());
            initialize_storage(&paths, &settings)?;
            if !paths.is_initialized() {
                settings.save(&paths)?;
            }
            println!("Initialization complete!");
            println!();
            println!("Parties:       {}", settings.parties);
            println!("Base currency: {}", settings.base_currency);
            println!();
            println!("Edit {} to change them.", paths.settings_file().display());
            println!(
                "Exchange rates are read from {}.",
                paths.rates_file().display()
            );
        }
        Some(Commands::Config) => {
            println!("splitledger Configuration");
            println!("=========================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!("Ledger file:    {}", settings.ledger_path(&paths).display());
            println!("Rates file:     {}", paths.rates_file().display());
            if needs_initialization(&paths, &settings) {
                println!("(not initialized yet, run 'splitledger init')");
            }
            println!();
            println!("Settings:");
            println!("  Parties:            {}", settings.parties);
            println!("  Base currency:      {}", settings.base_currency);
            println!("  Edit timestamps:    {:?}", settings.edit_timestamp_policy);
            println!("  Rate cache (secs):  {}", settings.rate_cache_ttl_secs);
            println!("  Date format:        {}", settings.date_format);
        }
        Some(Commands::Add(args)) => {
            handle_add_command(&Session::open(paths, settings)?, args)?;
        }
        Some(Commands::Scan(args)) => {
            handle_scan_command(&Session::open(paths, settings)?, args)?;
        }
        Some(Commands::History(args)) => {
            handle_history_command(&Session::open(paths, settings)?, args)?;
        }
        Some(Commands::Settle) => {
            handle_settle_command(&Session::open(paths, settings)?)?;
        }
        Some(Commands::Edit(args)) => {
            handle_edit_command(&Session::open(paths, settings)?, args)?;
        }
        Some(Commands::Delete(args)) => {
            handle_delete_command(&Session::open(paths, settings)?, args)?;
        }
        Some(Commands::Export(args)) => {
            handle_export_command(&Session::open(paths, settings)?, args)?;
        }
        None => {
            println!("splitledger - two-party shared expense ledger");
            println!();
            println!("Run 'splitledger --help' for usage information.");
        }
    }

    Ok(())
}
