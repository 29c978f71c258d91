//! Contract service
//!
//! Contracts hang off an agreement and a company. Deleting a contract
//! removes its amendments and payments with it.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::audit::{AuditEntry, EntityType};
use crate::error::{ConvenioError, ConvenioResult};
use crate::models::money::decimal;
use crate::models::{
    AgreementId, Amendment, CompanyId, Contract, ContractFinancials, ContractId, ContractStatus,
    Money, Payment,
};
use crate::storage::Storage;

use super::clean;

/// Fields supplied when creating a contract
#[derive(Debug, Clone, Deserialize)]
pub struct ContractInput {
    pub agreement_id: AgreementId,
    pub company_id: CompanyId,
    pub number: String,
    #[serde(default)]
    pub process_number: Option<String>,
    pub object: String,
    #[serde(default, with = "decimal")]
    pub contracted_value: Money,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: ContractStatus,
}

/// A contract with its company name and derived financial figures
#[derive(Debug, Clone)]
pub struct ContractSummary {
    pub contract: Contract,
    pub company_name: String,
    pub financials: ContractFinancials,
    pub amendment_count: usize,
    pub payment_count: usize,
}

#[derive(Serialize)]
struct ContractWire<'a> {
    id: ContractId,
    agreement_id: AgreementId,
    company_id: CompanyId,
    number: &'a str,
    process_number: &'a Option<String>,
    object: &'a str,
    #[serde(with = "decimal")]
    contracted_value: Money,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    status: ContractStatus,
    created_at: DateTime<Utc>,
    company_name: &'a str,
    financials: &'a ContractFinancials,
    amendment_count: usize,
    payment_count: usize,
}

impl Serialize for ContractSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let c = &self.contract;
        ContractWire {
            id: c.id,
            agreement_id: c.agreement_id,
            company_id: c.company_id,
            number: &c.number,
            process_number: &c.process_number,
            object: &c.object,
            contracted_value: c.contracted_value,
            start_date: c.start_date,
            end_date: c.end_date,
            status: c.status,
            created_at: c.created_at,
            company_name: &self.company_name,
            financials: &self.financials,
            amendment_count: self.amendment_count,
            payment_count: self.payment_count,
        }
        .serialize(serializer)
    }
}

pub struct ContractService<'a> {
    storage: &'a Storage,
}

impl<'a> ContractService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: ContractInput) -> ConvenioResult<Contract> {
        if !self.storage.agreements.exists(input.agreement_id)? {
            return Err(ConvenioError::agreement_not_found(input.agreement_id.to_string()));
        }
        if !self.storage.companies.exists(input.company_id)? {
            return Err(ConvenioError::company_not_found(input.company_id.to_string()));
        }

        let mut contract = Contract::new(
            input.agreement_id,
            input.company_id,
            input.number.trim(),
            input.object.trim(),
            input.contracted_value,
            input.start_date,
        );
        contract.process_number = clean(input.process_number);
        contract.end_date = input.end_date;
        contract.status = input.status;
        contract
            .validate()
            .map_err(|e| ConvenioError::Validation(e.to_string()))?;

        self.storage.contracts.upsert(contract.clone())?;
        self.storage.contracts.save()?;

        self.storage.log_create(
            EntityType::Contract,
            contract.id.to_string(),
            Some(contract.number.clone()),
            &contract,
        )?;
        tracing::info!(
            contract = %contract.id,
            agreement = %contract.agreement_id,
            value = %contract.contracted_value,
            "contract created"
        );

        Ok(contract)
    }

    pub fn get(&self, id: ContractId) -> ConvenioResult<Option<Contract>> {
        self.storage.contracts.get(id)
    }

    /// Find by full UUID, short id or contract number
    pub fn find(&self, identifier: &str) -> ConvenioResult<Option<Contract>> {
        let identifier = identifier.trim();
        if let Ok(id) = ContractId::parse(identifier) {
            return self.storage.contracts.get(id);
        }
        if let Some(contract) = self
            .storage
            .contracts
            .find(|c| c.id.matches_short(identifier))?
        {
            return Ok(Some(contract));
        }
        self.storage.contracts.find(|c| c.number == identifier)
    }

    pub fn resolve(&self, identifier: &str) -> ConvenioResult<Contract> {
        self.find(identifier)?
            .ok_or_else(|| ConvenioError::contract_not_found(identifier))
    }

    pub fn list(&self) -> ConvenioResult<Vec<Contract>> {
        self.storage.contracts.get_all()
    }

    pub fn list_by_agreement(&self, agreement_id: AgreementId) -> ConvenioResult<Vec<Contract>> {
        self.storage.contracts.get_by_agreement(agreement_id)
    }

    pub fn financials(&self, contract: &Contract) -> ConvenioResult<ContractFinancials> {
        let amendments = self.storage.amendments.get_by_contract(contract.id)?;
        let payments = self.storage.payments.get_by_contract(contract.id)?;
        Ok(ContractFinancials::compute(contract, &amendments, &payments)?)
    }

    /// Summaries for a set of contracts, reading children once
    pub fn summarize(&self, contracts: Vec<Contract>) -> ConvenioResult<Vec<ContractSummary>> {
        let ids: HashSet<ContractId> = contracts.iter().map(|c| c.id).collect();

        let mut amendments: HashMap<ContractId, Vec<Amendment>> = HashMap::new();
        for amendment in self.storage.amendments.filter(|a| ids.contains(&a.contract_id))? {
            amendments.entry(amendment.contract_id).or_default().push(amendment);
        }
        let mut payments: HashMap<ContractId, Vec<Payment>> = HashMap::new();
        for payment in self.storage.payments.filter(|p| ids.contains(&p.contract_id))? {
            payments.entry(payment.contract_id).or_default().push(payment);
        }

        let mut summaries = Vec::with_capacity(contracts.len());
        for contract in contracts {
            let contract_amendments = amendments.remove(&contract.id).unwrap_or_default();
            let contract_payments = payments.remove(&contract.id).unwrap_or_default();
            let company_name = self
                .storage
                .companies
                .get(contract.company_id)?
                .map(|c| c.display_name().to_string())
                .unwrap_or_else(|| contract.company_id.to_string());

            summaries.push(ContractSummary {
                financials: ContractFinancials::compute(
                    &contract,
                    &contract_amendments,
                    &contract_payments,
                )?,
                company_name,
                amendment_count: contract_amendments.len(),
                payment_count: contract_payments.len(),
                contract,
            });
        }

        Ok(summaries)
    }

    pub fn summary(&self, contract: Contract) -> ConvenioResult<ContractSummary> {
        self.summarize(vec![contract])?
            .pop()
            .ok_or_else(|| ConvenioError::Storage("contract summary missing".into()))
    }

    pub fn set_status(&self, id: ContractId, status: ContractStatus) -> ConvenioResult<Contract> {
        let before = self
            .storage
            .contracts
            .get(id)?
            .ok_or_else(|| ConvenioError::contract_not_found(id.to_string()))?;

        let mut contract = before.clone();
        contract.status = status;

        self.storage.contracts.upsert(contract.clone())?;
        self.storage.contracts.save()?;

        self.storage.log_update(
            EntityType::Contract,
            contract.id.to_string(),
            Some(contract.number.clone()),
            &before,
            &contract,
            Some(format!("status: {} -> {}", before.status, contract.status)),
        )?;

        Ok(contract)
    }

    /// Delete one contract with its amendments and payments
    pub fn delete(&self, id: ContractId) -> ConvenioResult<Contract> {
        let contract = self
            .storage
            .contracts
            .get(id)?
            .ok_or_else(|| ConvenioError::contract_not_found(id.to_string()))?;

        let entries = self.remove_where(|c| c.id == id)?;
        self.storage.log_entries(&entries)?;
        tracing::info!(contract = %id, removed = entries.len(), "contract deleted");

        Ok(contract)
    }

    /// Remove every contract of the given agreements, plus their children.
    /// Returns the audit entries for the caller to record.
    pub(crate) fn remove_for_agreements(
        &self,
        agreement_ids: &HashSet<AgreementId>,
    ) -> ConvenioResult<Vec<AuditEntry>> {
        self.remove_where(|c| agreement_ids.contains(&c.agreement_id))
    }

    fn remove_where<F>(&self, predicate: F) -> ConvenioResult<Vec<AuditEntry>>
    where
        F: Fn(&Contract) -> bool,
    {
        let contracts = self.storage.contracts.delete_where(predicate)?;
        if contracts.is_empty() {
            return Ok(Vec::new());
        }
        let ids: HashSet<ContractId> = contracts.iter().map(|c| c.id).collect();

        let amendments = self
            .storage
            .amendments
            .delete_where(|a| ids.contains(&a.contract_id))?;
        let payments = self
            .storage
            .payments
            .delete_where(|p| ids.contains(&p.contract_id))?;

        self.storage.payments.save()?;
        self.storage.amendments.save()?;
        self.storage.contracts.save()?;

        let mut entries = Vec::with_capacity(contracts.len() + amendments.len() + payments.len());
        entries.extend(payments.iter().map(|p| {
            AuditEntry::delete(EntityType::Payment, p.id.to_string(), None, p)
        }));
        entries.extend(amendments.iter().map(|a| {
            AuditEntry::delete(EntityType::Amendment, a.id.to_string(), Some(a.number.clone()), a)
        }));
        entries.extend(contracts.iter().map(|c| {
            AuditEntry::delete(EntityType::Contract, c.id.to_string(), Some(c.number.clone()), c)
        }));

        Ok(entries)
    }
}
