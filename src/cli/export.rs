//! CLI command for data export

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::error::{LedgerError, LedgerResult};
use crate::export::{export_json, export_records_csv, export_yaml, LedgerExport};

use super::Session;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// CSV format (records only)
    Csv,
    /// JSON format (records and settlement)
    Json,
    /// YAML format (records and settlement, human-readable)
    Yaml,
}

/// Arguments for `export`
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ExportFormat,
    /// Output file path; standard output when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Handle `export`
pub fn handle_export_command(session: &Session, args: ExportArgs) -> LedgerResult<()> {
    let service = session.service();
    let view = service.history()?;

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).map_err(|e| {
            LedgerError::Export(format!("Failed to create file {}: {}", path.display(), e))
        })?)),
        None => Box::new(io::stdout().lock()),
    };

    match args.format {
        ExportFormat::Csv => export_records_csv(view.records(), &mut writer)?,
        ExportFormat::Json => {
            let export =
                LedgerExport::new(&view, service.settlement(&view), &session.settings.parties);
            export_json(&export, &mut writer)?;
            writeln!(writer).map_err(|e| LedgerError::Export(e.to_string()))?;
        }
        ExportFormat::Yaml => {
            let export =
                LedgerExport::new(&view, service.settlement(&view), &session.settings.parties);
            export_yaml(&export, &mut writer)?;
        }
    }
    writer
        .flush()
        .map_err(|e| LedgerError::Export(e.to_string()))?;

    if let Some(path) = &args.output {
        eprintln!(
            "Exported {} records to: {}",
            view.records().len(),
            path.display()
        );
    }
    Ok(())
}
