//! Expense CLI commands
//!
//! Implements add, scan, edit and delete.

use std::path::PathBuf;

use chrono::Local;
use clap::Args;

use crate::display::format_record_details;
use crate::error::{LedgerError, LedgerResult};
use crate::models::SplitPolicy;
use crate::services::{
    ExpenseChanges, JsonReplyExtractor, LedgerView, NewExpense, ReceiptDetails, ReceiptExtractor,
    RecordKey,
};

use super::{parse_amount, parse_currency, parse_date, parse_split, Session};

/// Arguments for `add`
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Who paid
    pub payer: String,
    /// Shop or vendor name
    pub shop: String,
    /// Amount as printed on the receipt (e.g. "45.20")
    pub amount: String,
    /// Receipt currency (code or symbol), defaults to the base currency
    #[arg(short, long)]
    pub currency: Option<String>,
    /// Transaction date (YYYY-MM-DD), defaults to today
    #[arg(short, long)]
    pub date: Option<String>,
    /// Free-text remarks
    #[arg(short, long)]
    pub remarks: Option<String>,
    /// Split this expense between both parties
    #[arg(short, long)]
    pub shared: bool,
    /// Split weights, "equal" or "first:second" (e.g. "1:2")
    #[arg(long, requires = "shared")]
    pub split: Option<String>,
}

/// Arguments for `scan`
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// File holding the extraction reply (JSON, optionally fenced)
    pub reply: PathBuf,
    /// Who paid
    #[arg(short, long)]
    pub payer: String,
    /// Free-text remarks
    #[arg(short, long)]
    pub remarks: Option<String>,
    /// Split this expense between both parties
    #[arg(short, long)]
    pub shared: bool,
    /// Split weights, "equal" or "first:second"
    #[arg(long, requires = "shared")]
    pub split: Option<String>,
}

/// How a command picks one record
#[derive(Args, Debug)]
pub struct RecordRef {
    /// Record reference as shown by `history` (e.g. exp-1a2b3c4d)
    #[arg(required_unless_present = "at", conflicts_with = "at")]
    pub reference: Option<String>,
    /// Timestamp of a record without a reference ("YYYY-MM-DD HH:MM:SS")
    #[arg(long, requires = "user")]
    pub at: Option<String>,
    /// Payer of the record given with --at
    #[arg(long, requires = "at")]
    pub user: Option<String>,
}

impl RecordRef {
    fn resolve(&self, view: &LedgerView) -> LedgerResult<RecordKey> {
        match (&self.reference, &self.at, &self.user) {
            (Some(reference), _, _) => view.find(reference),
            (None, Some(at), Some(user)) => view.find_stamp(at, user),
            _ => Err(LedgerError::Validation(
                "Give a record reference, or --at with --user".into(),
            )),
        }
    }
}

/// Arguments for `edit`
#[derive(Args, Debug)]
pub struct EditArgs {
    #[command(flatten)]
    pub record: RecordRef,
    /// New payer
    #[arg(long)]
    pub payer: Option<String>,
    /// New shop name
    #[arg(long)]
    pub shop: Option<String>,
    /// New receipt amount (converted again)
    #[arg(long)]
    pub amount: Option<String>,
    /// New receipt currency (converted again)
    #[arg(long)]
    pub currency: Option<String>,
    /// New transaction date
    #[arg(long)]
    pub date: Option<String>,
    /// New remarks
    #[arg(long)]
    pub remarks: Option<String>,
    /// Shared or not
    #[arg(long)]
    pub shared: Option<bool>,
    /// New split weights
    #[arg(long)]
    pub split: Option<String>,
}

/// Arguments for `delete`
#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub record: RecordRef,
}

fn split_or_default(split: Option<&str>) -> LedgerResult<SplitPolicy> {
    split.map(parse_split).transpose().map(Option::unwrap_or_default)
}

/// Handle `add`
pub fn handle_add_command(session: &Session, args: AddArgs) -> LedgerResult<()> {
    let input = NewExpense {
        payer: args.payer,
        shop: args.shop,
        amount: parse_amount(&args.amount)?,
        currency: args.currency.as_deref().map(parse_currency).transpose()?,
        date: match args.date.as_deref() {
            Some(d) => parse_date(d)?,
            None => Local::now().date_naive(),
        },
        remarks: args.remarks.unwrap_or_default(),
        shared: args.shared,
        split: split_or_default(args.split.as_deref())?,
    };

    let record = session.service().submit(input)?;

    println!("Recorded expense:");
    print!("{}", format_record_details(&record));
    Ok(())
}

/// Handle `scan`
pub fn handle_scan_command(session: &Session, args: ScanArgs) -> LedgerResult<()> {
    let payload = std::fs::read(&args.reply).map_err(|e| {
        LedgerError::Io(format!("Failed to read {}: {}", args.reply.display(), e))
    })?;
    let guess = JsonReplyExtractor.extract(&payload)?;

    let details = ReceiptDetails {
        payer: args.payer,
        remarks: args.remarks.unwrap_or_default(),
        shared: args.shared,
        split: split_or_default(args.split.as_deref())?,
    };

    let scanned = session
        .service()
        .submit_receipt(&guess, details, Local::now().date_naive())?;

    println!("Recorded expense from receipt:");
    print!("{}", format_record_details(&scanned.record));
    if !scanned.defaulted.is_empty() {
        println!(
            "Not found on the receipt, defaults used for: {}",
            scanned.defaulted.join(", ")
        );
    }
    Ok(())
}

/// Handle `edit`
pub fn handle_edit_command(session: &Session, args: EditArgs) -> LedgerResult<()> {
    let changes = ExpenseChanges {
        payer: args.payer,
        shop: args.shop,
        amount: args.amount.as_deref().map(parse_amount).transpose()?,
        currency: args.currency.as_deref().map(parse_currency).transpose()?,
        date: args.date.as_deref().map(parse_date).transpose()?,
        remarks: args.remarks,
        shared: args.shared,
        split: args.split.as_deref().map(parse_split).transpose()?,
    };

    if changes.is_empty() {
        println!("No changes specified.");
        return Ok(());
    }

    let service = session.service();
    let view = service.history()?;
    let key = args.record.resolve(&view)?;
    let record = service.update(view, &key, changes)?;

    println!("Updated expense:");
    print!("{}", format_record_details(&record));
    Ok(())
}

/// Handle `delete`
pub fn handle_delete_command(session: &Session, args: DeleteArgs) -> LedgerResult<()> {
    let service = session.service();
    let view = service.history()?;
    let key = args.record.resolve(&view)?;
    let removed = service.delete(view, &key)?;

    println!(
        "Deleted expense: {} {} {} at {}",
        removed.payer, removed.amount, removed.currency, removed.shop
    );
    Ok(())
}
