//! Company service
//!
//! CRUD for contracted companies. A company cannot be deleted while any
//! contract still references it.

use crate::audit::EntityType;
use crate::error::{ConvenioError, ConvenioResult};
use crate::models::{Company, CompanyId};
use crate::storage::Storage;

use super::clean;

pub struct CompanyService<'a> {
    storage: &'a Storage,
}

impl<'a> CompanyService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(
        &self,
        tax_id: &str,
        legal_name: &str,
        trade_name: Option<String>,
    ) -> ConvenioResult<Company> {
        let tax_id = tax_id.trim();
        if self.storage.companies.tax_id_exists(tax_id, None)? {
            return Err(ConvenioError::Duplicate {
                entity_type: "Company",
                identifier: tax_id.to_string(),
            });
        }

        let mut company = Company::new(tax_id, legal_name.trim());
        company.trade_name = clean(trade_name);
        company
            .validate()
            .map_err(|e| ConvenioError::Validation(e.to_string()))?;

        self.storage.companies.upsert(company.clone())?;
        self.storage.companies.save()?;

        self.storage.log_create(
            EntityType::Company,
            company.id.to_string(),
            Some(company.legal_name.clone()),
            &company,
        )?;
        tracing::info!(company = %company.id, tax_id = %company.tax_id, "company created");

        Ok(company)
    }

    pub fn get(&self, id: CompanyId) -> ConvenioResult<Option<Company>> {
        self.storage.companies.get(id)
    }

    /// Find a company by tax id, short id or full UUID
    pub fn find(&self, identifier: &str) -> ConvenioResult<Option<Company>> {
        if let Some(company) = self.storage.companies.get_by_tax_id(identifier)? {
            return Ok(Some(company));
        }
        if let Ok(id) = CompanyId::parse(identifier.trim()) {
            return self.storage.companies.get(id);
        }
        self.storage.companies.find(|c| c.id.matches_short(identifier))
    }

    /// Like [`CompanyService::find`] but missing companies are an error
    pub fn resolve(&self, identifier: &str) -> ConvenioResult<Company> {
        self.find(identifier)?
            .ok_or_else(|| ConvenioError::company_not_found(identifier))
    }

    pub fn list(&self) -> ConvenioResult<Vec<Company>> {
        self.storage.companies.get_all()
    }

    /// Change the legal and/or trade name
    pub fn update(
        &self,
        id: CompanyId,
        legal_name: Option<&str>,
        trade_name: Option<String>,
    ) -> ConvenioResult<Company> {
        let before = self
            .storage
            .companies
            .get(id)?
            .ok_or_else(|| ConvenioError::company_not_found(id.to_string()))?;

        let mut company = before.clone();
        if let Some(name) = legal_name {
            company.legal_name = name.trim().to_string();
        }
        if trade_name.is_some() {
            company.trade_name = clean(trade_name);
        }
        company
            .validate()
            .map_err(|e| ConvenioError::Validation(e.to_string()))?;

        self.storage.companies.upsert(company.clone())?;
        self.storage.companies.save()?;

        self.storage.log_update(
            EntityType::Company,
            company.id.to_string(),
            Some(company.legal_name.clone()),
            &before,
            &company,
            None,
        )?;

        Ok(company)
    }

    pub fn delete(&self, id: CompanyId) -> ConvenioResult<Company> {
        let company = self
            .storage
            .companies
            .get(id)?
            .ok_or_else(|| ConvenioError::company_not_found(id.to_string()))?;

        let contracts = self.storage.contracts.count_by_company(id)?;
        if contracts > 0 {
            return Err(ConvenioError::Protected {
                entity_type: "Company",
                identifier: company.legal_name.clone(),
                referenced_by: "contract(s)",
                count: contracts,
            });
        }

        self.storage.companies.delete(id)?;
        self.storage.companies.save()?;

        self.storage.log_delete(
            EntityType::Company,
            company.id.to_string(),
            Some(company.legal_name.clone()),
            &company,
        )?;
        tracing::info!(company = %company.id, "company deleted");

        Ok(company)
    }
}
