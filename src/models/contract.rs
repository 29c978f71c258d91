//! Contract model
//!
//! Procurement contracts executed under an agreement's funding, plus the
//! financial figures derived from their amendments and payments.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::amendment::Amendment;
use super::ids::{AgreementId, CompanyId, ContractId};
use super::money::{Money, MoneyOverflow};
use super::payment::Payment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractStatus {
    #[serde(rename = "ATIVO")]
    Active,
    #[serde(rename = "ENCERRADO")]
    Closed,
    #[serde(rename = "RESCINDIDO")]
    Terminated,
}

impl ContractStatus {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Active => "ATIVO",
            Self::Closed => "ENCERRADO",
            Self::Terminated => "RESCINDIDO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ativo" | "active" => Some(Self::Active),
            "encerrado" | "closed" => Some(Self::Closed),
            "rescindido" | "terminated" => Some(Self::Terminated),
            _ => None,
        }
    }
}

impl Default for ContractStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Ativo"),
            Self::Closed => write!(f, "Encerrado"),
            Self::Terminated => write!(f, "Rescindido"),
        }
    }
}

/// A procurement contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,

    /// Funding agreement; contracts are removed together with it
    pub agreement_id: AgreementId,

    /// Contracted company; a company with contracts cannot be removed
    pub company_id: CompanyId,

    pub number: String,

    #[serde(default)]
    pub process_number: Option<String>,

    pub object: String,

    pub contracted_value: Money,

    pub start_date: NaiveDate,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    pub status: ContractStatus,

    pub created_at: DateTime<Utc>,
}

impl Contract {
    pub fn new(
        agreement_id: AgreementId,
        company_id: CompanyId,
        number: impl Into<String>,
        object: impl Into<String>,
        contracted_value: Money,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: ContractId::new(),
            agreement_id,
            company_id,
            number: number.into(),
            process_number: None,
            object: object.into(),
            contracted_value,
            start_date,
            end_date: None,
            status: ContractStatus::default(),
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), ContractValidationError> {
        if self.number.trim().is_empty() {
            return Err(ContractValidationError::EmptyNumber);
        }
        if self.number.chars().count() > 80 {
            return Err(ContractValidationError::NumberTooLong(self.number.chars().count()));
        }
        if self.object.trim().is_empty() {
            return Err(ContractValidationError::EmptyObject);
        }
        if self.contracted_value.is_negative() {
            return Err(ContractValidationError::NegativeValue);
        }
        if !self.contracted_value.is_within_limit() {
            return Err(ContractValidationError::ValueTooLarge);
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(ContractValidationError::EndBeforeStart {
                    start: self.start_date,
                    end,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractValidationError {
    #[error("Contract number cannot be empty")]
    EmptyNumber,
    #[error("Contract number too long ({0} chars, max 80)")]
    NumberTooLong(usize),
    #[error("Contract object cannot be empty")]
    EmptyObject,
    #[error("Contracted value cannot be negative")]
    NegativeValue,
    #[error("Contracted value exceeds the limit of R$ 999.999.999.999,99")]
    ValueTooLarge,
    #[error("Contract end {end} is before its start {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

/// Figures derived from a contract's amendments and payments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContractFinancials {
    #[serde(with = "super::money::decimal")]
    pub contracted_value: Money,
    #[serde(with = "super::money::decimal")]
    pub increases: Money,
    #[serde(with = "super::money::decimal")]
    pub decreases: Money,
    #[serde(with = "super::money::decimal")]
    pub adjusted_value: Money,
    #[serde(with = "super::money::decimal")]
    pub total_paid: Money,
    #[serde(with = "super::money::decimal")]
    pub balance: Money,
}

impl ContractFinancials {
    /// Compute from any amendment/payment sets; children of other contracts
    /// are ignored.
    pub fn compute<'a, A, P>(contract: &Contract, amendments: A, payments: P) -> Result<Self, MoneyOverflow>
    where
        A: IntoIterator<Item = &'a Amendment>,
        P: IntoIterator<Item = &'a Payment>,
    {
        let (mut increases, mut decreases) = (Money::zero(), Money::zero());
        for amendment in amendments.into_iter().filter(|a| a.contract_id == contract.id) {
            increases = increases.checked_add(amendment.increase).ok_or(MoneyOverflow)?;
            decreases = decreases.checked_add(amendment.decrease).ok_or(MoneyOverflow)?;
        }

        let total_paid = Money::checked_sum(
            payments
                .into_iter()
                .filter(|p| p.contract_id == contract.id)
                .map(|p| p.amount),
        )?;

        let adjusted_value = contract
            .contracted_value
            .checked_add(increases)
            .and_then(|v| v.checked_sub(decreases))
            .ok_or(MoneyOverflow)?;
        let balance = adjusted_value.checked_sub(total_paid).ok_or(MoneyOverflow)?;

        Ok(Self {
            contracted_value: contract.contracted_value,
            increases,
            decreases,
            adjusted_value,
            total_paid,
            balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::amendment::AmendmentType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn contract(value: i64) -> Contract {
        Contract::new(
            AgreementId::new(),
            CompanyId::new(),
            "CT-001/2025",
            "Obra de pavimentação",
            Money::from_cents(value),
            date(2025, 3, 1),
        )
    }

    #[test]
    fn test_without_children() {
        let c = contract(100000);
        let fin = ContractFinancials::compute(&c, &Vec::<Amendment>::new(), &Vec::<Payment>::new()).unwrap();
        assert_eq!(fin.adjusted_value, c.contracted_value);
        assert_eq!(fin.total_paid, Money::zero());
        assert_eq!(fin.balance, c.contracted_value);
    }

    #[test]
    fn test_amendments_and_payments() {
        let c = contract(100000);

        let mut add = Amendment::new(c.id, AmendmentType::Value, "1º TA", date(2025, 4, 1));
        add.increase = Money::from_cents(25000);
        let mut cut = Amendment::new(c.id, AmendmentType::Reduction, "2º TA", date(2025, 5, 1));
        cut.decrease = Money::from_cents(5000);
        let mut foreign = Amendment::new(ContractId::new(), AmendmentType::Value, "X", date(2025, 5, 1));
        foreign.increase = Money::from_cents(999999);

        let p1 = Payment::new(c.id, date(2025, 4, 10), Money::from_cents(30000));
        let p2 = Payment::new(c.id, date(2025, 5, 10), Money::from_cents(20000));
        let other = Payment::new(ContractId::new(), date(2025, 5, 10), Money::from_cents(1));

        let fin = ContractFinancials::compute(&c, &[add, cut, foreign], &[p1, p2, other]).unwrap();

        assert_eq!(fin.increases, Money::from_cents(25000));
        assert_eq!(fin.decreases, Money::from_cents(5000));
        assert_eq!(fin.adjusted_value, Money::from_cents(120000));
        assert_eq!(fin.total_paid, Money::from_cents(50000));
        assert_eq!(fin.balance, Money::from_cents(70000));
    }

    #[test]
    fn test_overflowing_payments_are_reported() {
        let c = contract(100000);
        let p1 = Payment::new(c.id, date(2025, 4, 10), Money::from_cents(i64::MAX));
        let p2 = Payment::new(c.id, date(2025, 4, 11), Money::from_cents(1));

        let result = ContractFinancials::compute(&c, &Vec::<Amendment>::new(), &[p1, p2]);
        assert_eq!(result, Err(MoneyOverflow));
    }

    #[test]
    fn test_value_limit() {
        let mut c = contract(Money::MAX.cents());
        assert!(c.validate().is_ok());
        c.contracted_value = Money::from_cents(Money::MAX.cents() + 1);
        assert_eq!(c.validate(), Err(ContractValidationError::ValueTooLarge));
    }

    #[test]
    fn test_validation() {
        let mut c = contract(100);
        assert!(c.validate().is_ok());

        c.end_date = Some(date(2025, 2, 1));
        assert!(matches!(
            c.validate(),
            Err(ContractValidationError::EndBeforeStart { .. })
        ));

        c.end_date = None;
        c.number = " ".into();
        assert_eq!(c.validate(), Err(ContractValidationError::EmptyNumber));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(ContractStatus::parse("ENCERRADO"), Some(ContractStatus::Closed));
        assert_eq!(ContractStatus::parse("terminated"), Some(ContractStatus::Terminated));
        assert_eq!(ContractStatus::parse("x"), None);
    }
}
