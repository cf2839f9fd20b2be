//! History and settlement CLI commands

use clap::Args;

use crate::display::{format_history_table, format_settlement, format_skipped};
use crate::error::{LedgerError, LedgerResult};

use super::Session;

/// Arguments for `history`
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Number of records to show
    #[arg(short, long)]
    pub limit: Option<usize>,
    /// Only records paid by this party
    #[arg(short, long)]
    pub user: Option<String>,
    /// List lines that could not be read
    #[arg(long)]
    pub show_skipped: bool,
}

/// Handle `history`
pub fn handle_history_command(session: &Session, args: HistoryArgs) -> LedgerResult<()> {
    let view = session.service().history()?;

    let payer = match args.user.as_deref() {
        Some(user) => Some(session.settings.parties.canonical(user).ok_or_else(|| {
            LedgerError::Validation(format!(
                "Unknown payer '{}'. Expected {} or {}",
                user, session.settings.parties.first, session.settings.parties.second
            ))
        })?),
        None => None,
    };

    let mut records = view.newest_first();
    if let Some(payer) = payer {
        records.retain(|r| r.payer.trim().eq_ignore_ascii_case(payer));
    }
    let total = records.len();
    if let Some(limit) = args.limit {
        records.truncate(limit);
    }

    println!(
        "{}",
        format_history_table(&records, &session.settings.date_format)
    );
    if records.len() < total {
        println!("Showing {} of {} records.", records.len(), total);
    }

    if !view.skipped().is_empty() {
        if args.show_skipped {
            print!("{}", format_skipped(view.skipped()));
        } else {
            println!(
                "{} line(s) could not be read (use --show-skipped to list them).",
                view.skipped().len()
            );
        }
    }

    Ok(())
}

/// Handle `settle`
pub fn handle_settle_command(session: &Session) -> LedgerResult<()> {
    let service = session.service();
    let view = service.history()?;
    let settlement = service.settlement(&view);

    print!(
        "{}",
        format_settlement(&settlement, &session.settings.parties)
    );
    Ok(())
}
