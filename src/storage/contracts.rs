//! Contract, amendment and payment repositories
//!
//! Contracts are stored in contracts.json; their amendments and payments in
//! amendments.json and payments.json.

use std::cmp::Ordering;

use crate::error::ConvenioError;
use crate::models::{
    AgreementId, Amendment, AmendmentId, CompanyId, Contract, ContractId, Payment, PaymentId,
};

use super::repository::{Record, Repository};

impl Record for Contract {
    type Id = ContractId;
    const ENTITY: &'static str = "Contract";

    fn id(&self) -> ContractId {
        self.id
    }

    /// Newest first
    fn default_order(&self, other: &Self) -> Ordering {
        other.created_at.cmp(&self.created_at)
    }
}

impl Record for Amendment {
    type Id = AmendmentId;
    const ENTITY: &'static str = "Amendment";

    fn id(&self) -> AmendmentId {
        self.id
    }

    /// Most recent date first
    fn default_order(&self, other: &Self) -> Ordering {
        other
            .date
            .cmp(&self.date)
            .then_with(|| self.number.cmp(&other.number))
    }
}

impl Record for Payment {
    type Id = PaymentId;
    const ENTITY: &'static str = "Payment";

    fn id(&self) -> PaymentId {
        self.id
    }

    /// Most recent date first
    fn default_order(&self, other: &Self) -> Ordering {
        other.date.cmp(&self.date)
    }
}

pub type ContractRepository = Repository<Contract>;
pub type AmendmentRepository = Repository<Amendment>;
pub type PaymentRepository = Repository<Payment>;

impl Repository<Contract> {
    pub fn get_by_agreement(&self, agreement_id: AgreementId) -> Result<Vec<Contract>, ConvenioError> {
        self.filter(|c| c.agreement_id == agreement_id)
    }

    pub fn count_by_company(&self, company_id: CompanyId) -> Result<usize, ConvenioError> {
        self.count_where(|c| c.company_id == company_id)
    }
}

impl Repository<Amendment> {
    pub fn get_by_contract(&self, contract_id: ContractId) -> Result<Vec<Amendment>, ConvenioError> {
        self.filter(|a| a.contract_id == contract_id)
    }
}

impl Repository<Payment> {
    pub fn get_by_contract(&self, contract_id: ContractId) -> Result<Vec<Payment>, ConvenioError> {
        self.filter(|p| p.contract_id == contract_id)
    }

    /// Payments of any contract in the given set
    pub fn get_by_contracts(&self, contract_ids: &[ContractId]) -> Result<Vec<Payment>, ConvenioError> {
        self.filter(|p| contract_ids.contains(&p.contract_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn test_contracts_by_agreement_and_company() {
        let temp_dir = TempDir::new().unwrap();
        let repo = ContractRepository::new(temp_dir.path().join("contracts.json"));

        let agreement = AgreementId::new();
        let company = CompanyId::new();
        repo.upsert(Contract::new(agreement, company, "1", "obj", Money::zero(), date(1)))
            .unwrap();
        repo.upsert(Contract::new(agreement, CompanyId::new(), "2", "obj", Money::zero(), date(1)))
            .unwrap();
        repo.upsert(Contract::new(AgreementId::new(), company, "3", "obj", Money::zero(), date(1)))
            .unwrap();

        assert_eq!(repo.get_by_agreement(agreement).unwrap().len(), 2);
        assert_eq!(repo.count_by_company(company).unwrap(), 2);
    }

    #[test]
    fn test_payments_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let repo = PaymentRepository::new(temp_dir.path().join("payments.json"));

        let contract = ContractId::new();
        repo.upsert(Payment::new(contract, date(5), Money::from_cents(1))).unwrap();
        repo.upsert(Payment::new(contract, date(20), Money::from_cents(2))).unwrap();
        repo.upsert(Payment::new(ContractId::new(), date(9), Money::from_cents(3))).unwrap();

        let payments = repo.get_by_contract(contract).unwrap();
        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].date, date(20));

        let both = repo.get_by_contracts(&[contract]).unwrap();
        assert_eq!(both.len(), 2);
    }
}
