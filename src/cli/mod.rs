//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod agreement;
pub mod company;
pub mod contract;
pub mod export;
pub mod report;

pub use agreement::{handle_agreement_command, AgreementCommands};
pub use company::{handle_company_command, CompanyCommands};
pub use contract::{
    handle_amendment_command, handle_contract_command, handle_payment_command, AmendmentCommands,
    ContractCommands, PaymentCommands,
};
pub use export::{handle_export_command, ExportCommands};
pub use report::{handle_report_command, ReportCommands};

use chrono::NaiveDate;

use crate::error::{ConvenioError, ConvenioResult};
use crate::models::Money;

/// Parse a `YYYY-MM-DD` argument
pub(crate) fn parse_date(value: &str) -> ConvenioResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ConvenioError::Validation(format!("Invalid date '{}'. Use YYYY-MM-DD", value))
    })
}

/// Parse an amount like `1500`, `1500.50` or `1.500,50`
pub(crate) fn parse_money(value: &str) -> ConvenioResult<Money> {
    Money::parse(value)
        .map_err(|e| ConvenioError::Validation(format!("Invalid amount '{}': {}", value, e)))
}
