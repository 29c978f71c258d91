//! Company repository
//!
//! Manages loading and saving companies to companies.json

use std::cmp::Ordering;

use crate::error::ConvenioError;
use crate::models::{Company, CompanyId};

use super::repository::{Record, Repository};

impl Record for Company {
    type Id = CompanyId;
    const ENTITY: &'static str = "Company";

    fn id(&self) -> CompanyId {
        self.id
    }

    fn default_order(&self, other: &Self) -> Ordering {
        self.legal_name.cmp(&other.legal_name)
    }
}

pub type CompanyRepository = Repository<Company>;

/// Tax ids compare on their digits only, so `12.345.678/0001-90` and
/// `12345678000190` are the same company.
pub fn normalize_tax_id(tax_id: &str) -> String {
    tax_id.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

impl Repository<Company> {
    pub fn get_by_tax_id(&self, tax_id: &str) -> Result<Option<Company>, ConvenioError> {
        let wanted = normalize_tax_id(tax_id);
        self.find(|c| normalize_tax_id(&c.tax_id) == wanted)
    }

    /// Check if a tax id is already taken
    pub fn tax_id_exists(
        &self,
        tax_id: &str,
        exclude_id: Option<CompanyId>,
    ) -> Result<bool, ConvenioError> {
        let wanted = normalize_tax_id(tax_id);
        Ok(self
            .find(|c| normalize_tax_id(&c.tax_id) == wanted && Some(c.id) != exclude_id)?
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tax_id_lookup_ignores_punctuation() {
        let temp_dir = TempDir::new().unwrap();
        let repo = CompanyRepository::new(temp_dir.path().join("companies.json"));

        let company = Company::new("12.345.678/0001-90", "Alfa Ltda");
        let id = company.id;
        repo.upsert(company).unwrap();

        assert!(repo.get_by_tax_id("12345678000190").unwrap().is_some());
        assert!(repo.tax_id_exists("12.345.678/0001-90", None).unwrap());
        assert!(!repo.tax_id_exists("12.345.678/0001-90", Some(id)).unwrap());
        assert!(!repo.tax_id_exists("99.999.999/0001-99", None).unwrap());
    }
}
