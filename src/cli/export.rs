//! CLI commands for data export

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use crate::error::{ConvenioError, ConvenioResult};
use crate::export::{export_contracts_csv, export_full_json, export_full_yaml, FullExport};
use crate::storage::Storage;

/// Full export format
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// JSON (machine-readable)
    Json,
    /// YAML (human-readable)
    Yaml,
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export the whole database to a file
    All {
        /// Output file path
        output: PathBuf,
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Export contracts with adjusted values and balances to CSV
    Contracts { output: PathBuf },
    /// Show what an export would contain
    Info,
}

fn create_writer(output: &PathBuf) -> ConvenioResult<BufWriter<File>> {
    let file = File::create(output).map_err(|e| {
        ConvenioError::Export(format!("Failed to create file {}: {}", output.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

/// Handle export commands
pub fn handle_export_command(storage: &Storage, cmd: ExportCommands) -> ConvenioResult<()> {
    match cmd {
        ExportCommands::All {
            output,
            format,
            pretty,
        } => {
            let mut writer = create_writer(&output)?;
            match format {
                ExportFormat::Json => export_full_json(storage, &mut writer, pretty)?,
                ExportFormat::Yaml => export_full_yaml(storage, &mut writer)?,
            }
            println!("Full database exported to: {}", output.display());
        }

        ExportCommands::Contracts { output } => {
            export_contracts_csv(storage, create_writer(&output)?)?;
            println!("Contracts exported to: {}", output.display());
        }

        ExportCommands::Info => {
            let export = FullExport::from_storage(storage)?;
            let m = &export.metadata;
            println!("Export Information");
            println!("==================");
            println!("Schema version: {}", export.schema_version);
            println!("Companies:      {}", m.company_count);
            println!("Agreements:     {}", m.agreement_count);
            println!("Contracts:      {}", m.contract_count);
            println!("Amendments:     {}", m.amendment_count);
            println!("Payments:       {}", m.payment_count);
            if let (Some(first), Some(last)) = (&m.earliest_validity_end, &m.latest_validity_end) {
                println!("Validity ends:  {} to {}", first, last);
            }
        }
    }

    Ok(())
}
