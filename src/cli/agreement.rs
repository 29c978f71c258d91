//! Agreement CLI commands

use clap::{Args, Subcommand};

use crate::config::Settings;
use crate::display::{format_agreement_detail, format_agreement_list};
use crate::error::{ConvenioError, ConvenioResult};
use crate::models::{AgreementStatus, AgreementType};
use crate::services::{AgreementInput, AgreementService};
use crate::storage::Storage;

use super::{parse_date, parse_money};

/// Optional agreement fields shared by `create` and `edit`
#[derive(Args, Debug, Default)]
pub struct AgreementOptions {
    /// Validity start (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,
    /// Transfer amount (repasse), e.g. "150000.00"
    #[arg(long)]
    pub transfer: Option<String>,
    /// Counterpart amount (contrapartida)
    #[arg(long)]
    pub counterpart: Option<String>,
    /// Agreement instrument number
    #[arg(long)]
    pub instrument: Option<String>,
    #[arg(long)]
    pub proposal: Option<String>,
    /// Indication / earmark number
    #[arg(long)]
    pub indication: Option<String>,
    /// Sponsoring legislator
    #[arg(long)]
    pub legislator: Option<String>,
    /// Status code (CAPTACAO, PROPOSTA, CONVENIADO, EXECUCAO, PRESTACAO, CONCLUIDO, CANCELADO)
    #[arg(long)]
    pub status: Option<String>,
    /// Bidding modality
    #[arg(long)]
    pub modality: Option<String>,
    #[arg(long)]
    pub bidding_process: Option<String>,
    /// Whether the bidding was held (true/false)
    #[arg(long)]
    pub bid_held: Option<bool>,
    /// Whether the transfer was received (true/false)
    #[arg(long)]
    pub received: Option<bool>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl AgreementOptions {
    fn apply(self, input: &mut AgreementInput) -> ConvenioResult<()> {
        if let Some(start) = self.start {
            input.validity_start = if start.trim().is_empty() {
                None
            } else {
                Some(parse_date(&start)?)
            };
        }
        if let Some(value) = self.transfer {
            input.transfer_amount = parse_money(&value)?;
        }
        if let Some(value) = self.counterpart {
            input.counterpart_amount = parse_money(&value)?;
        }
        if let Some(status) = self.status {
            input.status = parse_status(&status)?;
        }
        if let Some(flag) = self.bid_held {
            input.bid_held = flag;
        }
        if let Some(flag) = self.received {
            input.transfer_received = flag;
        }

        let texts = [
            (self.instrument, &mut input.instrument_number),
            (self.proposal, &mut input.proposal_number),
            (self.indication, &mut input.indication_number),
            (self.legislator, &mut input.legislator_name),
            (self.modality, &mut input.modality),
            (self.bidding_process, &mut input.bidding_process_number),
            (self.notes, &mut input.notes),
        ];
        for (value, field) in texts {
            if value.is_some() {
                *field = value;
            }
        }
        Ok(())
    }
}

fn parse_type(value: &str) -> ConvenioResult<AgreementType> {
    AgreementType::parse(value).ok_or_else(|| {
        ConvenioError::Validation(format!(
            "Invalid agreement type: '{}'. Valid types: FEDERAL, ESTADUAL, EMENDA_SAUDE, ESPECIAL",
            value
        ))
    })
}

fn parse_status(value: &str) -> ConvenioResult<AgreementStatus> {
    AgreementStatus::parse(value).ok_or_else(|| {
        ConvenioError::Validation(format!("Invalid agreement status: '{}'", value))
    })
}

/// Agreement subcommands
#[derive(Subcommand, Debug)]
pub enum AgreementCommands {
    /// Register a new agreement
    Create {
        /// Type (FEDERAL, ESTADUAL, EMENDA_SAUDE, ESPECIAL)
        #[arg(short = 't', long = "type")]
        agreement_type: String,
        /// Grantor agency
        #[arg(short, long)]
        agency: String,
        /// Object of the agreement
        #[arg(short, long)]
        object: String,
        /// Validity end (YYYY-MM-DD)
        #[arg(short, long)]
        end: String,
        /// Who is registering it
        #[arg(long, env = "CONVENIOS_USER")]
        user: Option<String>,
        #[command(flatten)]
        options: AgreementOptions,
    },
    /// List agreements, newest first
    List {
        /// Only agreements whose transfer was received
        #[arg(long, conflicts_with = "pending")]
        received: bool,
        /// Only agreements still waiting for the transfer
        #[arg(long)]
        pending: bool,
    },
    /// Show an agreement with its contracts
    Show {
        /// Agreement ID (full UUID or short form)
        agreement: String,
    },
    /// Change fields of an agreement
    Edit {
        /// Agreement ID
        agreement: String,
        #[arg(short = 't', long = "type")]
        agreement_type: Option<String>,
        #[arg(short, long)]
        agency: Option<String>,
        #[arg(short, long)]
        object: Option<String>,
        #[arg(short, long)]
        end: Option<String>,
        #[command(flatten)]
        options: AgreementOptions,
    },
    /// Delete agreements with their contracts, amendments and payments
    Delete {
        /// One or more agreement IDs
        #[arg(required = true)]
        agreements: Vec<String>,
    },
}

/// Handle an agreement command
pub fn handle_agreement_command(
    storage: &Storage,
    settings: &Settings,
    cmd: AgreementCommands,
) -> ConvenioResult<()> {
    let service = AgreementService::new(storage);
    let today = chrono::Local::now().date_naive();

    match cmd {
        AgreementCommands::Create {
            agreement_type,
            agency,
            object,
            end,
            user,
            options,
        } => {
            let mut input =
                AgreementInput::new(parse_type(&agreement_type)?, agency, object, parse_date(&end)?);
            options.apply(&mut input)?;

            let agreement = service.create(input, user)?;
            println!("Created agreement: {}", agreement.reference());
            println!("  Agency: {}", agreement.agency);
            println!("  Total:  {}", agreement.total_value());
            println!("  ID:     {}", agreement.id);
        }

        AgreementCommands::List { received, pending } => {
            let flag = match (received, pending) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let summaries = service.summarize(service.list(flag)?, today)?;
            println!("{}", format_agreement_list(&summaries, &settings.date_format));
        }

        AgreementCommands::Show { agreement } => {
            let found = service.resolve(&agreement)?;
            let detail = service.detail(found.id, today)?;
            print!("{}", format_agreement_detail(&detail, &settings.date_format));
        }

        AgreementCommands::Edit {
            agreement,
            agreement_type,
            agency,
            object,
            end,
            options,
        } => {
            let found = service.resolve(&agreement)?;
            let mut input = AgreementInput::from(&found);
            if let Some(value) = agreement_type {
                input.agreement_type = parse_type(&value)?;
            }
            if let Some(value) = agency {
                input.agency = value;
            }
            if let Some(value) = object {
                input.object = value;
            }
            if let Some(value) = end {
                input.validity_end = parse_date(&value)?;
            }
            options.apply(&mut input)?;

            let updated = service.update(found.id, input)?;
            println!("Updated agreement: {}", updated.reference());
        }

        AgreementCommands::Delete { agreements } => {
            if let [single] = agreements.as_slice() {
                let found = service.resolve(single)?;
                service.delete(found.id)?;
                println!("Deleted agreement: {}", found.reference());
            } else {
                let mut ids = Vec::with_capacity(agreements.len());
                for identifier in &agreements {
                    match service.find(identifier)? {
                        Some(found) => ids.push(found.id),
                        None => eprintln!("Skipping unknown agreement: {}", identifier),
                    }
                }
                let deleted = service.delete_many(&ids)?;
                println!("Deleted {} agreement(s)", deleted);
            }
        }
    }

    Ok(())
}
