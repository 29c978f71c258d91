//! Amendment service

use chrono::NaiveDate;
use serde::Deserialize;

use crate::audit::EntityType;
use crate::error::{ConvenioError, ConvenioResult};
use crate::models::money::decimal;
use crate::models::{Amendment, AmendmentId, AmendmentType, ContractId, Money};
use crate::storage::Storage;

use super::clean;

#[derive(Debug, Clone, Deserialize)]
pub struct AmendmentInput {
    pub contract_id: ContractId,
    #[serde(rename = "type")]
    pub amendment_type: AmendmentType,
    pub number: String,
    pub date: NaiveDate,
    #[serde(default, with = "decimal")]
    pub increase: Money,
    #[serde(default, with = "decimal")]
    pub decrease: Money,
    #[serde(default)]
    pub extension_days: i32,
    #[serde(default)]
    pub justification: Option<String>,
}

pub struct AmendmentService<'a> {
    storage: &'a Storage,
}

impl<'a> AmendmentService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: AmendmentInput) -> ConvenioResult<Amendment> {
        if !self.storage.contracts.exists(input.contract_id)? {
            return Err(ConvenioError::contract_not_found(input.contract_id.to_string()));
        }

        let mut amendment = Amendment::new(
            input.contract_id,
            input.amendment_type,
            input.number.trim(),
            input.date,
        );
        amendment.increase = input.increase;
        amendment.decrease = input.decrease;
        amendment.extension_days = input.extension_days;
        amendment.justification = clean(input.justification);
        amendment
            .validate()
            .map_err(|e| ConvenioError::Validation(e.to_string()))?;

        self.storage.amendments.upsert(amendment.clone())?;
        self.storage.amendments.save()?;

        self.storage.log_create(
            EntityType::Amendment,
            amendment.id.to_string(),
            Some(amendment.number.clone()),
            &amendment,
        )?;
        tracing::info!(amendment = %amendment.id, contract = %amendment.contract_id, "amendment created");

        Ok(amendment)
    }

    pub fn list_by_contract(&self, contract_id: ContractId) -> ConvenioResult<Vec<Amendment>> {
        self.storage.amendments.get_by_contract(contract_id)
    }

    /// Find by full UUID or short id
    pub fn find(&self, identifier: &str) -> ConvenioResult<Option<Amendment>> {
        if let Ok(id) = AmendmentId::parse(identifier.trim()) {
            return self.storage.amendments.get(id);
        }
        self.storage.amendments.find(|a| a.id.matches_short(identifier))
    }

    pub fn delete(&self, id: AmendmentId) -> ConvenioResult<Amendment> {
        let amendment = self
            .storage
            .amendments
            .delete(id)?
            .ok_or_else(|| ConvenioError::amendment_not_found(id.to_string()))?;
        self.storage.amendments.save()?;

        self.storage.log_delete(
            EntityType::Amendment,
            amendment.id.to_string(),
            Some(amendment.number.clone()),
            &amendment,
        )?;

        Ok(amendment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgreementId, CompanyId, Contract};
    use crate::services::test_support::create_test_storage;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn input(contract_id: ContractId) -> AmendmentInput {
        AmendmentInput {
            contract_id,
            amendment_type: AmendmentType::Value,
            number: "1º Termo Aditivo".into(),
            date: date(),
            increase: Money::from_cents(5_000),
            decrease: Money::zero(),
            extension_days: 0,
            justification: None,
        }
    }

    #[test]
    fn test_create_list_delete() {
        let (_temp_dir, storage) = create_test_storage();
        let contract = Contract::new(AgreementId::new(), CompanyId::new(), "1", "x", Money::zero(), date());
        storage.contracts.upsert(contract.clone()).unwrap();
        let service = AmendmentService::new(&storage);

        let amendment = service.create(input(contract.id)).unwrap();
        assert_eq!(service.list_by_contract(contract.id).unwrap().len(), 1);
        assert_eq!(
            service.find(&amendment.id.to_string()).unwrap().unwrap().id,
            amendment.id
        );

        service.delete(amendment.id).unwrap();
        assert!(service.list_by_contract(contract.id).unwrap().is_empty());
        assert!(service.delete(amendment.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_rejects_unknown_contract_and_negative_values() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AmendmentService::new(&storage);
        assert!(service.create(input(ContractId::new())).unwrap_err().is_not_found());

        let contract = Contract::new(AgreementId::new(), CompanyId::new(), "1", "x", Money::zero(), date());
        storage.contracts.upsert(contract.clone()).unwrap();
        let mut bad = input(contract.id);
        bad.decrease = Money::from_cents(-1);
        assert!(service.create(bad).unwrap_err().is_validation());
    }
}
