//! Company model
//!
//! Contracted companies, identified by their tax id (CNPJ).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::ids::CompanyId;

pub const TAX_ID_MAX_LEN: usize = 18;
pub const NAME_MAX_LEN: usize = 220;

/// A contracted company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,

    /// Tax id (CNPJ), unique across companies
    pub tax_id: String,

    /// Registered legal name (razão social)
    pub legal_name: String,

    /// Trade name (nome fantasia)
    #[serde(default)]
    pub trade_name: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Company {
    pub fn new(tax_id: impl Into<String>, legal_name: impl Into<String>) -> Self {
        Self {
            id: CompanyId::new(),
            tax_id: tax_id.into(),
            legal_name: legal_name.into(),
            trade_name: None,
            created_at: Utc::now(),
        }
    }

    /// Trade name when present, legal name otherwise
    pub fn display_name(&self) -> &str {
        self.trade_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.legal_name)
    }

    pub fn validate(&self) -> Result<(), CompanyValidationError> {
        let tax_id = self.tax_id.trim();
        if tax_id.is_empty() {
            return Err(CompanyValidationError::EmptyTaxId);
        }
        if tax_id.chars().count() > TAX_ID_MAX_LEN {
            return Err(CompanyValidationError::TaxIdTooLong(tax_id.chars().count()));
        }
        if self.legal_name.trim().is_empty() {
            return Err(CompanyValidationError::EmptyLegalName);
        }
        if self.legal_name.chars().count() > NAME_MAX_LEN {
            return Err(CompanyValidationError::NameTooLong(self.legal_name.chars().count()));
        }
        if let Some(trade) = &self.trade_name {
            if trade.chars().count() > NAME_MAX_LEN {
                return Err(CompanyValidationError::NameTooLong(trade.chars().count()));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompanyValidationError {
    #[error("Company tax id cannot be empty")]
    EmptyTaxId,
    #[error("Company tax id too long ({0} chars, max 18)")]
    TaxIdTooLong(usize),
    #[error("Company legal name cannot be empty")]
    EmptyLegalName,
    #[error("Company name too long ({0} chars, max 220)")]
    NameTooLong(usize),
}
