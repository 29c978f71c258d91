//! Company CLI commands

use clap::Subcommand;

use crate::display::{format_company_details, format_company_list};
use crate::error::ConvenioResult;
use crate::services::CompanyService;
use crate::storage::Storage;

/// Company subcommands
#[derive(Subcommand, Debug)]
pub enum CompanyCommands {
    /// Register a contracted company
    Create {
        /// Tax id (CNPJ)
        tax_id: String,
        /// Legal name (razão social)
        legal_name: String,
        /// Trade name (nome fantasia)
        #[arg(long)]
        trade_name: Option<String>,
    },
    /// List companies
    List,
    /// Show company details
    Show {
        /// Tax id or company ID
        company: String,
    },
    /// Rename a company
    Edit {
        /// Tax id or company ID
        company: String,
        #[arg(long)]
        legal_name: Option<String>,
        /// New trade name; an empty value clears it
        #[arg(long)]
        trade_name: Option<String>,
    },
    /// Delete a company without contracts
    Delete {
        /// Tax id or company ID
        company: String,
    },
}

/// Handle a company command
pub fn handle_company_command(storage: &Storage, cmd: CompanyCommands) -> ConvenioResult<()> {
    let service = CompanyService::new(storage);

    match cmd {
        CompanyCommands::Create {
            tax_id,
            legal_name,
            trade_name,
        } => {
            let company = service.create(&tax_id, &legal_name, trade_name)?;
            println!("Created company: {}", company.display_name());
            println!("  CNPJ: {}", company.tax_id);
            println!("  ID:   {}", company.id);
        }

        CompanyCommands::List => {
            println!("{}", format_company_list(&service.list()?));
        }

        CompanyCommands::Show { company } => {
            let found = service.resolve(&company)?;
            let contracts = storage.contracts.count_by_company(found.id)?;
            print!("{}", format_company_details(&found, contracts));
        }

        CompanyCommands::Edit {
            company,
            legal_name,
            trade_name,
        } => {
            if legal_name.is_none() && trade_name.is_none() {
                println!("No changes specified. Use --legal-name or --trade-name.");
                return Ok(());
            }
            let found = service.resolve(&company)?;
            let updated = service.update(found.id, legal_name.as_deref(), trade_name)?;
            println!("Updated company: {}", updated.display_name());
        }

        CompanyCommands::Delete { company } => {
            let found = service.resolve(&company)?;
            let deleted = service.delete(found.id)?;
            println!("Deleted company: {}", deleted.display_name());
        }
    }

    Ok(())
}
