//! Payment model
//!
//! Disbursements recorded against a contract.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::ids::{ContractId, PaymentId};
use super::money::Money;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,

    pub contract_id: ContractId,

    pub date: NaiveDate,

    pub amount: Money,

    /// Budget commitment (empenho) number
    #[serde(default)]
    pub commitment_number: Option<String>,

    /// Bank order (OB) number
    #[serde(default)]
    pub bank_order_number: Option<String>,

    /// Invoice (NF) number
    #[serde(default)]
    pub invoice_number: Option<String>,

    #[serde(default)]
    pub note: Option<String>,
}

impl Payment {
    pub fn new(contract_id: ContractId, date: NaiveDate, amount: Money) -> Self {
        Self {
            id: PaymentId::new(),
            contract_id,
            date,
            amount,
            commitment_number: None,
            bank_order_number: None,
            invoice_number: None,
            note: None,
        }
    }

    pub fn validate(&self) -> Result<(), PaymentValidationError> {
        if !self.amount.is_positive() {
            return Err(PaymentValidationError::NonPositiveAmount);
        }
        if !self.amount.is_within_limit() {
            return Err(PaymentValidationError::AmountTooLarge);
        }
        if let Some(note) = &self.note {
            if note.chars().count() > 255 {
                return Err(PaymentValidationError::NoteTooLong(note.chars().count()));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.date, self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentValidationError {
    #[error("Payment amount must be positive")]
    NonPositiveAmount,
    #[error("Payment amount exceeds the limit of R$ 999.999.999.999,99")]
    AmountTooLarge,
    #[error("Payment note too long ({0} chars, max 255)")]
    NoteTooLong(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        let mut p = Payment::new(ContractId::new(), date, Money::from_cents(30000));
        assert!(p.validate().is_ok());
        assert_eq!(p.to_string(), "2025-02-03 - R$ 300,00");

        p.amount = Money::zero();
        assert_eq!(p.validate(), Err(PaymentValidationError::NonPositiveAmount));

        p.amount = Money::MAX;
        assert!(p.validate().is_ok());
        p.amount = Money::from_cents(Money::MAX.cents() + 1);
        assert_eq!(p.validate(), Err(PaymentValidationError::AmountTooLarge));

        p.amount = Money::from_cents(1);
        p.note = Some("x".repeat(256));
        assert_eq!(p.validate(), Err(PaymentValidationError::NoteTooLong(256)));
    }
}
