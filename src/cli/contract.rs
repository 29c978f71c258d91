//! Contract, amendment and payment CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_amendment_list, format_contract_list, format_payment_list};
use crate::error::{ConvenioError, ConvenioResult};
use crate::models::{AmendmentType, ContractStatus};
use crate::services::{
    AgreementService, AmendmentInput, AmendmentService, CompanyService, ContractInput,
    ContractService, PaymentInput, PaymentService,
};
use crate::storage::Storage;

use super::{parse_date, parse_money};

fn parse_contract_status(value: &str) -> ConvenioResult<ContractStatus> {
    ContractStatus::parse(value).ok_or_else(|| {
        ConvenioError::Validation(format!(
            "Invalid contract status: '{}'. Valid: ATIVO, ENCERRADO, RESCINDIDO",
            value
        ))
    })
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Contract subcommands
#[derive(Subcommand, Debug)]
pub enum ContractCommands {
    /// Register a contract under an agreement
    Create {
        /// Agreement ID
        agreement: String,
        /// Company tax id or ID
        company: String,
        /// Contract number
        number: String,
        /// Contracted value, e.g. "85000.00"
        value: String,
        #[arg(short, long)]
        object: String,
        /// Start date (YYYY-MM-DD, default today)
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        /// Administrative process number
        #[arg(long)]
        process: Option<String>,
    },
    /// List contracts
    List {
        /// Only contracts of this agreement
        #[arg(short, long)]
        agreement: Option<String>,
    },
    /// Show a contract with its amendments and payments
    Show {
        /// Contract ID or number
        contract: String,
    },
    /// Change a contract's status
    Status {
        contract: String,
        /// ATIVO, ENCERRADO or RESCINDIDO
        status: String,
    },
    /// Delete a contract with its amendments and payments
    Delete { contract: String },
}

/// Handle a contract command
pub fn handle_contract_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ContractCommands,
) -> ConvenioResult<()> {
    let service = ContractService::new(storage);

    match cmd {
        ContractCommands::Create {
            agreement,
            company,
            number,
            value,
            object,
            start,
            end,
            process,
        } => {
            let agreement = AgreementService::new(storage).resolve(&agreement)?;
            let company = CompanyService::new(storage).resolve(&company)?;
            let input = ContractInput {
                agreement_id: agreement.id,
                company_id: company.id,
                number,
                process_number: process,
                object,
                contracted_value: parse_money(&value)?,
                start_date: start.as_deref().map(parse_date).transpose()?.unwrap_or_else(today),
                end_date: end.as_deref().map(parse_date).transpose()?,
                status: ContractStatus::default(),
            };

            let contract = service.create(input)?;
            println!("Created contract: {}", contract.number);
            println!("  Company: {}", company.display_name());
            println!("  Value:   {}", contract.contracted_value);
            println!("  ID:      {}", contract.id);
        }

        ContractCommands::List { agreement } => {
            let contracts = match agreement {
                Some(identifier) => {
                    let found = AgreementService::new(storage).resolve(&identifier)?;
                    service.list_by_agreement(found.id)?
                }
                None => service.list()?,
            };
            println!("{}", format_contract_list(&service.summarize(contracts)?));
        }

        ContractCommands::Show { contract } => {
            let found = service.resolve(&contract)?;
            let id = found.id;
            let summary = service.summary(found)?;
            let f = &summary.financials;

            println!("Contract {} ({})", summary.contract.number, id);
            println!("  Company:    {}", summary.company_name);
            println!("  Object:     {}", summary.contract.object);
            println!("  Status:     {}", summary.contract.status);
            println!("  Contracted: {:>18}", f.contracted_value);
            println!("  Increases:  {:>18}", f.increases);
            println!("  Decreases:  {:>18}", f.decreases);
            println!("  Adjusted:   {:>18}", f.adjusted_value);
            println!("  Paid:       {:>18}", f.total_paid);
            println!("  Balance:    {:>18}", f.balance);
            println!();
            println!("Amendments");
            let amendments = AmendmentService::new(storage).list_by_contract(id)?;
            println!("{}", format_amendment_list(&amendments, &settings.date_format));
            println!();
            println!("Payments");
            let payments = PaymentService::new(storage).list_by_contract(id)?;
            println!("{}", format_payment_list(&payments, &settings.date_format));
        }

        ContractCommands::Status { contract, status } => {
            let found = service.resolve(&contract)?;
            let updated = service.set_status(found.id, parse_contract_status(&status)?)?;
            println!("Contract {} is now {}", updated.number, updated.status);
        }

        ContractCommands::Delete { contract } => {
            let found = service.resolve(&contract)?;
            let deleted = service.delete(found.id)?;
            println!("Deleted contract: {}", deleted.number);
        }
    }

    Ok(())
}

/// Amendment subcommands
#[derive(Subcommand, Debug)]
pub enum AmendmentCommands {
    /// Record an amendment (aditivo) to a contract
    Add {
        /// Contract ID or number
        contract: String,
        /// PRAZO, VALOR, QUANTITATIVO, REAJUSTE or SUPRESSAO
        #[arg(short = 't', long = "type")]
        amendment_type: String,
        /// Amendment number
        #[arg(short, long)]
        number: String,
        /// Date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<String>,
        /// Value added to the contract
        #[arg(long)]
        increase: Option<String>,
        /// Value removed from the contract
        #[arg(long)]
        decrease: Option<String>,
        /// Term extension in days
        #[arg(long, default_value = "0")]
        extension_days: i32,
        #[arg(long)]
        justification: Option<String>,
    },
    /// List the amendments of a contract
    List { contract: String },
    /// Delete an amendment
    Delete { amendment: String },
}

/// Handle an amendment command
pub fn handle_amendment_command(
    storage: &Storage,
    settings: &Settings,
    cmd: AmendmentCommands,
) -> ConvenioResult<()> {
    let service = AmendmentService::new(storage);
    let contracts = ContractService::new(storage);

    match cmd {
        AmendmentCommands::Add {
            contract,
            amendment_type,
            number,
            date,
            increase,
            decrease,
            extension_days,
            justification,
        } => {
            let contract = contracts.resolve(&contract)?;
            let amendment_type = AmendmentType::parse(&amendment_type).ok_or_else(|| {
                ConvenioError::Validation(format!("Invalid amendment type: '{}'", amendment_type))
            })?;
            let input = AmendmentInput {
                contract_id: contract.id,
                amendment_type,
                number,
                date: date.as_deref().map(parse_date).transpose()?.unwrap_or_else(today),
                increase: increase.as_deref().map(parse_money).transpose()?.unwrap_or_default(),
                decrease: decrease.as_deref().map(parse_money).transpose()?.unwrap_or_default(),
                extension_days,
                justification,
            };

            let amendment = service.create(input)?;
            let financials = contracts.financials(&contract)?;
            println!("Recorded amendment {} on contract {}", amendment.number, contract.number);
            println!("  Adjusted value: {}", financials.adjusted_value);
        }

        AmendmentCommands::List { contract } => {
            let contract = contracts.resolve(&contract)?;
            let amendments = service.list_by_contract(contract.id)?;
            println!("{}", format_amendment_list(&amendments, &settings.date_format));
        }

        AmendmentCommands::Delete { amendment } => {
            let found = service
                .find(&amendment)?
                .ok_or_else(|| ConvenioError::amendment_not_found(&amendment))?;
            let deleted = service.delete(found.id)?;
            println!("Deleted amendment: {}", deleted.number);
        }
    }

    Ok(())
}

/// Payment subcommands
#[derive(Subcommand, Debug)]
pub enum PaymentCommands {
    /// Record a payment against a contract
    Add {
        /// Contract ID or number
        contract: String,
        /// Amount paid
        amount: String,
        /// Payment date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<String>,
        /// Budget commitment (empenho) number
        #[arg(long)]
        commitment: Option<String>,
        /// Bank order (OB) number
        #[arg(long)]
        bank_order: Option<String>,
        /// Invoice (NF) number
        #[arg(long)]
        invoice: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// List the payments of a contract
    List { contract: String },
    /// Delete a payment
    Delete { payment: String },
}

/// Handle a payment command
pub fn handle_payment_command(
    storage: &Storage,
    settings: &Settings,
    cmd: PaymentCommands,
) -> ConvenioResult<()> {
    let service = PaymentService::new(storage);
    let contracts = ContractService::new(storage);

    match cmd {
        PaymentCommands::Add {
            contract,
            amount,
            date,
            commitment,
            bank_order,
            invoice,
            note,
        } => {
            let contract = contracts.resolve(&contract)?;
            let input = PaymentInput {
                contract_id: contract.id,
                date: date.as_deref().map(parse_date).transpose()?.unwrap_or_else(today),
                amount: parse_money(&amount)?,
                commitment_number: commitment,
                bank_order_number: bank_order,
                invoice_number: invoice,
                note,
            };

            let payment = service.create(input)?;
            let financials = contracts.financials(&contract)?;
            println!("Recorded payment of {} on contract {}", payment.amount, contract.number);
            println!("  Balance: {}", financials.balance);
        }

        PaymentCommands::List { contract } => {
            let contract = contracts.resolve(&contract)?;
            let payments = service.list_by_contract(contract.id)?;
            println!("{}", format_payment_list(&payments, &settings.date_format));
        }

        PaymentCommands::Delete { payment } => {
            let found = service
                .find(&payment)?
                .ok_or_else(|| ConvenioError::payment_not_found(&payment))?;
            let deleted = service.delete(found.id)?;
            println!("Deleted payment of {}", deleted.amount);
        }
    }

    Ok(())
}
