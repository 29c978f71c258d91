//! CLI commands for reports

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::Settings;
use crate::error::{ConvenioError, ConvenioResult};
use crate::export::export_report_csv;
use crate::reports::{report_pdf, AgreementFilter, AgreementReport, Dashboard, REPORT_FILENAME};
use crate::storage::Storage;

/// Report filters, named like the HTTP query parameters
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Validity start on or after (YYYY-MM-DD)
    #[arg(long = "data-ini")]
    pub start_from: Option<String>,
    /// Validity end on or before (YYYY-MM-DD)
    #[arg(long = "data-fim")]
    pub end_until: Option<String>,
    /// VENCIDOS, VENCENDO, OK or a status code
    #[arg(long)]
    pub status: Option<String>,
    /// Agency contains (case-insensitive)
    #[arg(long = "orgao")]
    pub agency: Option<String>,
    /// Type code
    #[arg(long = "tipo")]
    pub agreement_type: Option<String>,
    /// Modality contains
    #[arg(long = "modalidade")]
    pub modality: Option<String>,
    /// Legislator contains
    #[arg(long = "parlamentar")]
    pub legislator: Option<String>,
    /// 1 for received transfers, 0 for pending
    #[arg(long = "repasse-recebido")]
    pub transfer_received: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> AgreementFilter {
        let pairs = [
            ("data_ini", &self.start_from),
            ("data_fim", &self.end_until),
            ("status", &self.status),
            ("orgao", &self.agency),
            ("tipo", &self.agreement_type),
            ("modalidade", &self.modality),
            ("parlamentar", &self.legislator),
            ("repasse_recebido", &self.transfer_received),
        ];
        AgreementFilter::from_pairs(
            pairs
                .into_iter()
                .filter_map(|(key, value)| value.as_ref().map(|v| (key, v.clone()))),
        )
    }
}

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Totals and breakdowns for the filtered agreements
    Summary {
        #[command(flatten)]
        filter: FilterArgs,
        /// Print the JSON payload instead of the text view
        #[arg(long)]
        json: bool,
    },
    /// Dashboard cards, type totals and alerts
    Dashboard {
        #[arg(long)]
        json: bool,
    },
    /// Write the PDF report
    Pdf {
        /// Output file
        #[arg(short, long, default_value = REPORT_FILENAME)]
        output: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Write the filtered agreements as CSV
    Csv {
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
    },
}

fn create_file(path: &PathBuf) -> ConvenioResult<File> {
    File::create(path).map_err(|e| {
        ConvenioError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })
}

/// Handle a report command
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ReportCommands,
) -> ConvenioResult<()> {
    let now = chrono::Local::now();
    let today = now.date_naive();
    let limit = settings.reports.list_limit;

    match cmd {
        ReportCommands::Summary { filter, json } => {
            let report = AgreementReport::generate(storage, filter.to_filter(), today, limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.format_terminal());
            }
        }

        ReportCommands::Dashboard { json } => {
            let dashboard = Dashboard::generate(storage, today)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
            } else {
                print!("{}", dashboard.format_terminal());
            }
        }

        ReportCommands::Pdf { output, filter } => {
            let report = AgreementReport::generate(storage, filter.to_filter(), today, limit)?;
            let bytes = report_pdf::render(&report, now.naive_local());
            std::fs::write(&output, bytes).map_err(|e| {
                ConvenioError::Export(format!("Failed to write {}: {}", output.display(), e))
            })?;
            println!(
                "Report with {} agreement(s) written to: {}",
                report.total_count,
                output.display()
            );
        }

        ReportCommands::Csv { output, filter } => {
            let report = AgreementReport::generate(storage, filter.to_filter(), today, limit)?;
            let writer = BufWriter::new(create_file(&output)?);
            export_report_csv(&report, writer)?;
            println!(
                "{} agreement(s) exported to: {}",
                report.total_count,
                output.display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::StatusFilter;

    #[test]
    fn test_filter_args_map_to_query_names() {
        let args = FilterArgs {
            status: Some("vencendo".into()),
            agency: Some("saúde".into()),
            transfer_received: Some("1".into()),
            ..Default::default()
        };
        let filter = args.to_filter();
        assert_eq!(filter.status, Some(StatusFilter::Expiring));
        assert_eq!(filter.agency.as_deref(), Some("saúde"));
        assert_eq!(filter.transfer_received, Some(true));
        assert!(filter.start_from.is_none());
    }

    #[test]
    fn test_empty_filter_args() {
        assert!(FilterArgs::default().to_filter().is_empty());
    }
}
