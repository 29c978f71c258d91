//! Agreement ("convênio") model
//!
//! A funding arrangement between a grantor agency and the organization.
//! Totals and alert state are always derived, never stored.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::alert::AlertBucket;
use super::ids::AgreementId;
use super::money::Money;

/// Funding source of an agreement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgreementType {
    #[serde(rename = "FEDERAL")]
    Federal,
    #[serde(rename = "ESTADUAL")]
    State,
    #[serde(rename = "EMENDA_SAUDE")]
    HealthEarmark,
    #[serde(rename = "ESPECIAL")]
    Special,
}

impl AgreementType {
    pub const ALL: [AgreementType; 4] = [
        Self::Federal,
        Self::State,
        Self::HealthEarmark,
        Self::Special,
    ];

    /// Persisted code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Federal => "FEDERAL",
            Self::State => "ESTADUAL",
            Self::HealthEarmark => "EMENDA_SAUDE",
            Self::Special => "ESPECIAL",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Federal => "Federal",
            Self::State => "Estadual",
            Self::HealthEarmark => "Emenda (Saúde)",
            Self::Special => "Especial",
        }
    }

    /// Parse from the persisted code or the English name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "federal" => Some(Self::Federal),
            "estadual" | "state" => Some(Self::State),
            "emenda_saude" | "health_earmark" | "health" => Some(Self::HealthEarmark),
            "especial" | "special" => Some(Self::Special),
            _ => None,
        }
    }
}

impl fmt::Display for AgreementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle status of an agreement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgreementStatus {
    #[serde(rename = "CAPTACAO")]
    Fundraising,
    #[serde(rename = "PROPOSTA")]
    Proposed,
    #[serde(rename = "CONVENIADO")]
    Agreed,
    #[serde(rename = "EXECUCAO")]
    InExecution,
    #[serde(rename = "PRESTACAO")]
    AccountingReview,
    #[serde(rename = "CONCLUIDO")]
    Completed,
    #[serde(rename = "CANCELADO")]
    Cancelled,
}

impl AgreementStatus {
    pub const ALL: [AgreementStatus; 7] = [
        Self::Fundraising,
        Self::Proposed,
        Self::Agreed,
        Self::InExecution,
        Self::AccountingReview,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Fundraising => "CAPTACAO",
            Self::Proposed => "PROPOSTA",
            Self::Agreed => "CONVENIADO",
            Self::InExecution => "EXECUCAO",
            Self::AccountingReview => "PRESTACAO",
            Self::Completed => "CONCLUIDO",
            Self::Cancelled => "CANCELADO",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Fundraising => "Em captação",
            Self::Proposed => "Proposta",
            Self::Agreed => "Conveniado",
            Self::InExecution => "Em execução",
            Self::AccountingReview => "Prestação de contas",
            Self::Completed => "Concluído",
            Self::Cancelled => "Cancelado",
        }
    }

    /// Parse from the persisted code (any case) or the English name
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|status| status.code().eq_ignore_ascii_case(&normalized))
            .or(match normalized.as_str() {
                "fundraising" => Some(Self::Fundraising),
                "proposed" => Some(Self::Proposed),
                "agreed" => Some(Self::Agreed),
                "in_execution" | "inexecution" => Some(Self::InExecution),
                "accounting_review" | "accountingreview" => Some(Self::AccountingReview),
                "completed" => Some(Self::Completed),
                "cancelled" | "canceled" => Some(Self::Cancelled),
                _ => None,
            })
    }
}

impl Default for AgreementStatus {
    fn default() -> Self {
        Self::Proposed
    }
}

impl fmt::Display for AgreementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A grant agreement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agreement {
    pub id: AgreementId,

    #[serde(rename = "type")]
    pub agreement_type: AgreementType,

    /// Indication / earmark number
    #[serde(default)]
    pub indication_number: Option<String>,

    #[serde(default)]
    pub proposal_number: Option<String>,

    /// Agreement instrument number
    #[serde(default)]
    pub instrument_number: Option<String>,

    /// Sponsoring legislator
    #[serde(default)]
    pub legislator_name: Option<String>,

    /// Grantor agency
    pub agency: String,

    pub object: String,

    #[serde(default)]
    pub transfer_amount: Money,

    #[serde(default)]
    pub counterpart_amount: Money,

    #[serde(default)]
    pub validity_start: Option<NaiveDate>,

    pub validity_end: NaiveDate,

    /// Whether the grantor has already paid the transfer
    #[serde(default)]
    pub transfer_received: bool,

    #[serde(default)]
    pub bid_held: bool,

    /// Bidding modality
    #[serde(default)]
    pub modality: Option<String>,

    #[serde(default)]
    pub bidding_process_number: Option<String>,

    #[serde(default)]
    pub status: AgreementStatus,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub created_by: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Agreement {
    /// Create an agreement with the mandatory fields; everything else defaults
    pub fn new(
        agreement_type: AgreementType,
        agency: impl Into<String>,
        object: impl Into<String>,
        validity_end: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AgreementId::new(),
            agreement_type,
            indication_number: None,
            proposal_number: None,
            instrument_number: None,
            legislator_name: None,
            agency: agency.into(),
            object: object.into(),
            transfer_amount: Money::zero(),
            counterpart_amount: Money::zero(),
            validity_start: None,
            validity_end,
            transfer_received: false,
            bid_held: false,
            modality: None,
            bidding_process_number: None,
            status: AgreementStatus::default(),
            notes: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transfer plus counterpart
    pub fn total_value(&self) -> Money {
        self.transfer_amount + self.counterpart_amount
    }

    /// Total value minus what has been paid on the agreement's contracts
    pub fn balance(&self, total_paid: Money) -> Money {
        self.total_value() - total_paid
    }

    /// Signed number of days from `today` until the validity end
    pub fn days_to_expire(&self, today: NaiveDate) -> i64 {
        (self.validity_end - today).num_days()
    }

    pub fn alert(&self, today: NaiveDate) -> AlertBucket {
        AlertBucket::classify(self.days_to_expire(today))
    }

    /// Most specific reference number available
    pub fn reference(&self) -> &str {
        [
            &self.instrument_number,
            &self.proposal_number,
            &self.indication_number,
        ]
        .into_iter()
        .flatten()
        .map(|s| s.as_str())
        .find(|s| !s.trim().is_empty())
        .unwrap_or("Sem número")
    }

    pub fn validate(&self) -> Result<(), AgreementValidationError> {
        if self.agency.trim().is_empty() {
            return Err(AgreementValidationError::EmptyAgency);
        }
        check_len("agency", Some(&self.agency), 200)?;
        if self.object.trim().is_empty() {
            return Err(AgreementValidationError::EmptyObject);
        }
        check_len("indication_number", self.indication_number.as_ref(), 60)?;
        check_len("proposal_number", self.proposal_number.as_ref(), 60)?;
        check_len("instrument_number", self.instrument_number.as_ref(), 60)?;
        check_len("legislator_name", self.legislator_name.as_ref(), 150)?;
        check_len("modality", self.modality.as_ref(), 60)?;
        check_len("bidding_process_number", self.bidding_process_number.as_ref(), 80)?;

        for (field, amount) in [
            ("transfer_amount", self.transfer_amount),
            ("counterpart_amount", self.counterpart_amount),
        ] {
            if amount.is_negative() {
                return Err(AgreementValidationError::NegativeAmount(field));
            }
            if !amount.is_within_limit() {
                return Err(AgreementValidationError::AmountTooLarge(field));
            }
        }
        if let Some(start) = self.validity_start {
            if start > self.validity_end {
                return Err(AgreementValidationError::InvertedValidity {
                    start,
                    end: self.validity_end,
                });
            }
        }
        Ok(())
    }
}

fn check_len(
    field: &'static str,
    value: Option<&String>,
    max: usize,
) -> Result<(), AgreementValidationError> {
    match value {
        Some(v) if v.chars().count() > max => Err(AgreementValidationError::TooLong {
            field,
            len: v.chars().count(),
            max,
        }),
        _ => Ok(()),
    }
}

impl fmt::Display for Agreement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.agency, self.reference())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgreementValidationError {
    #[error("Agreement agency cannot be empty")]
    EmptyAgency,
    #[error("Agreement object cannot be empty")]
    EmptyObject,
    #[error("Field '{field}' too long ({len} chars, max {max})")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("Field '{0}' cannot be negative")]
    NegativeAmount(&'static str),
    #[error("Field '{0}' exceeds the limit of R$ 999.999.999.999,99")]
    AmountTooLarge(&'static str),
    #[error("Validity start {start} is after validity end {end}")]
    InvertedValidity { start: NaiveDate, end: NaiveDate },
}
