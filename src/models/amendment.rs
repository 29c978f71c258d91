//! Amendment ("aditivo") model
//!
//! Modifications to a contract's value, quantity or term.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::ids::{AmendmentId, ContractId};
use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmendmentType {
    #[serde(rename = "PRAZO")]
    Term,
    #[serde(rename = "VALOR")]
    Value,
    #[serde(rename = "QUANTITATIVO")]
    Quantity,
    #[serde(rename = "REAJUSTE")]
    Readjustment,
    #[serde(rename = "SUPRESSAO")]
    Reduction,
}

impl AmendmentType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "prazo" | "term" => Some(Self::Term),
            "valor" | "value" => Some(Self::Value),
            "quantitativo" | "quantity" => Some(Self::Quantity),
            "reajuste" | "readjustment" => Some(Self::Readjustment),
            "supressao" | "supressão" | "reduction" => Some(Self::Reduction),
            _ => None,
        }
    }
}

impl fmt::Display for AmendmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Term => write!(f, "Prazo"),
            Self::Value => write!(f, "Valor"),
            Self::Quantity => write!(f, "Quantitativo"),
            Self::Readjustment => write!(f, "Reajuste"),
            Self::Reduction => write!(f, "Supressão"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amendment {
    pub id: AmendmentId,

    pub contract_id: ContractId,

    #[serde(rename = "type")]
    pub amendment_type: AmendmentType,

    pub number: String,

    pub date: NaiveDate,

    #[serde(default)]
    pub increase: Money,

    #[serde(default)]
    pub decrease: Money,

    /// Term extension in days
    #[serde(default)]
    pub extension_days: i32,

    #[serde(default)]
    pub justification: Option<String>,
}

impl Amendment {
    pub fn new(
        contract_id: ContractId,
        amendment_type: AmendmentType,
        number: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: AmendmentId::new(),
            contract_id,
            amendment_type,
            number: number.into(),
            date,
            increase: Money::zero(),
            decrease: Money::zero(),
            extension_days: 0,
            justification: None,
        }
    }

    pub fn validate(&self) -> Result<(), AmendmentValidationError> {
        if self.number.trim().is_empty() {
            return Err(AmendmentValidationError::EmptyNumber);
        }
        if self.increase.is_negative() || self.decrease.is_negative() {
            return Err(AmendmentValidationError::NegativeAmount);
        }
        if !self.increase.is_within_limit() || !self.decrease.is_within_limit() {
            return Err(AmendmentValidationError::AmountTooLarge);
        }
        if self.extension_days < 0 {
            return Err(AmendmentValidationError::NegativeExtension(self.extension_days));
        }
        Ok(())
    }
}

impl fmt::Display for Amendment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number, self.amendment_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmendmentValidationError {
    #[error("Amendment number cannot be empty")]
    EmptyNumber,
    #[error("Amendment increase and decrease cannot be negative")]
    NegativeAmount,
    #[error("Amendment amounts cannot exceed R$ 999.999.999.999,99")]
    AmountTooLarge,
    #[error("Term extension cannot be negative ({0} days)")]
    NegativeExtension(i32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_display() {
        let a = Amendment::new(
            ContractId::new(),
            AmendmentType::Term,
            "1º Termo Aditivo",
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        );
        assert!(a.increase.is_zero());
        assert!(a.decrease.is_zero());
        assert_eq!(a.extension_days, 0);
        assert_eq!(a.to_string(), "1º Termo Aditivo (Prazo)");
    }

    #[test]
    fn test_validation() {
        let mut a = Amendment::new(
            ContractId::new(),
            AmendmentType::Reduction,
            "2º TA",
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        );
        assert!(a.validate().is_ok());

        a.decrease = Money::from_cents(-5);
        assert_eq!(a.validate(), Err(AmendmentValidationError::NegativeAmount));

        a.decrease = Money::MAX;
        assert!(a.validate().is_ok());
        a.increase = Money::from_cents(Money::MAX.cents() + 1);
        assert_eq!(a.validate(), Err(AmendmentValidationError::AmountTooLarge));

        a.increase = Money::zero();
        a.decrease = Money::zero();
        a.extension_days = -1;
        assert_eq!(a.validate(), Err(AmendmentValidationError::NegativeExtension(-1)));
    }

    #[test]
    fn test_type_codes() {
        assert_eq!(serde_json::to_string(&AmendmentType::Reduction).unwrap(), "\"SUPRESSAO\"");
        assert_eq!(AmendmentType::parse("REAJUSTE"), Some(AmendmentType::Readjustment));
    }
}
