//! Payment service

use chrono::NaiveDate;
use serde::Deserialize;

use crate::audit::EntityType;
use crate::error::{ConvenioError, ConvenioResult};
use crate::models::money::decimal;
use crate::models::{ContractId, Money, Payment, PaymentId};
use crate::storage::Storage;

use super::clean;

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInput {
    pub contract_id: ContractId,
    pub date: NaiveDate,
    #[serde(with = "decimal")]
    pub amount: Money,
    #[serde(default)]
    pub commitment_number: Option<String>,
    #[serde(default)]
    pub bank_order_number: Option<String>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

pub struct PaymentService<'a> {
    storage: &'a Storage,
}

impl<'a> PaymentService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: PaymentInput) -> ConvenioResult<Payment> {
        if !self.storage.contracts.exists(input.contract_id)? {
            return Err(ConvenioError::contract_not_found(input.contract_id.to_string()));
        }

        let mut payment = Payment::new(input.contract_id, input.date, input.amount);
        payment.commitment_number = clean(input.commitment_number);
        payment.bank_order_number = clean(input.bank_order_number);
        payment.invoice_number = clean(input.invoice_number);
        payment.note = clean(input.note);
        payment
            .validate()
            .map_err(|e| ConvenioError::Validation(e.to_string()))?;

        self.storage.payments.upsert(payment.clone())?;
        self.storage.payments.save()?;

        self.storage
            .log_create(EntityType::Payment, payment.id.to_string(), None, &payment)?;
        tracing::info!(
            payment = %payment.id,
            contract = %payment.contract_id,
            amount = %payment.amount,
            "payment recorded"
        );

        Ok(payment)
    }

    pub fn list_by_contract(&self, contract_id: ContractId) -> ConvenioResult<Vec<Payment>> {
        self.storage.payments.get_by_contract(contract_id)
    }

    pub fn find(&self, identifier: &str) -> ConvenioResult<Option<Payment>> {
        if let Ok(id) = PaymentId::parse(identifier.trim()) {
            return self.storage.payments.get(id);
        }
        self.storage.payments.find(|p| p.id.matches_short(identifier))
    }

    pub fn delete(&self, id: PaymentId) -> ConvenioResult<Payment> {
        let payment = self
            .storage
            .payments
            .delete(id)?
            .ok_or_else(|| ConvenioError::payment_not_found(id.to_string()))?;
        self.storage.payments.save()?;

        self.storage
            .log_delete(EntityType::Payment, payment.id.to_string(), None, &payment)?;

        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgreementId, CompanyId, Contract};
    use crate::services::test_support::create_test_storage;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    fn input(contract_id: ContractId, cents: i64) -> PaymentInput {
        PaymentInput {
            contract_id,
            date: date(10),
            amount: Money::from_cents(cents),
            commitment_number: Some("2025NE0001".into()),
            bank_order_number: None,
            invoice_number: Some("".into()),
            note: None,
        }
    }

    #[test]
    fn test_record_and_delete() {
        let (_temp_dir, storage) = create_test_storage();
        let contract = Contract::new(AgreementId::new(), CompanyId::new(), "1", "x", Money::zero(), date(1));
        storage.contracts.upsert(contract.clone()).unwrap();
        let service = PaymentService::new(&storage);

        let payment = service.create(input(contract.id, 30_000)).unwrap();
        assert_eq!(payment.commitment_number.as_deref(), Some("2025NE0001"));
        assert!(payment.invoice_number.is_none());
        assert_eq!(service.list_by_contract(contract.id).unwrap().len(), 1);

        service.delete(payment.id).unwrap();
        assert!(service.find(&payment.id.to_string()).unwrap().is_none());
    }

    #[test]
    fn test_amount_must_be_positive() {
        let (_temp_dir, storage) = create_test_storage();
        let contract = Contract::new(AgreementId::new(), CompanyId::new(), "1", "x", Money::zero(), date(1));
        storage.contracts.upsert(contract.clone()).unwrap();
        let service = PaymentService::new(&storage);

        assert!(service.create(input(contract.id, 0)).unwrap_err().is_validation());
        assert!(service.create(input(ContractId::new(), 10)).unwrap_err().is_not_found());
    }

    #[test]
    fn test_input_accepts_decimal_amounts() {
        let contract_id = ContractId::new();
        let json = format!(
            r#"{{"contract_id": "{}", "date": "2025-05-10", "amount": 300.5}}"#,
            contract_id.as_uuid()
        );
        let input: PaymentInput = serde_json::from_str(&json).unwrap();
        assert_eq!(input.amount, Money::from_cents(30_050));
    }
}
