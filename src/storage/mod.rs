//! Storage layer
//!
//! JSON file storage with atomic writes. Each entity type has its own file
//! under `<base>/data/`; changes are recorded in the audit log.

pub mod agreements;
pub mod companies;
pub mod contracts;
pub mod file_io;
pub mod repository;

pub use agreements::AgreementRepository;
pub use companies::{normalize_tax_id, CompanyRepository};
pub use contracts::{AmendmentRepository, ContractRepository, PaymentRepository};
pub use file_io::{load_records, save_records};
pub use repository::{Record, Repository};

use serde::Serialize;

use crate::audit::{generate_diff, AuditEntry, AuditLogger, EntityType};
use crate::config::paths::ConvenioPaths;
use crate::error::ConvenioResult;

/// Owns every repository plus the audit log
pub struct Storage {
    paths: ConvenioPaths,
    pub companies: CompanyRepository,
    pub agreements: AgreementRepository,
    pub contracts: ContractRepository,
    pub amendments: AmendmentRepository,
    pub payments: PaymentRepository,
    audit: AuditLogger,
}

impl Storage {
    /// Create a storage rooted at `paths`, creating directories as needed.
    /// Nothing is read until [`Storage::load_all`].
    pub fn new(paths: ConvenioPaths) -> ConvenioResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            companies: CompanyRepository::new(paths.companies_file()),
            agreements: AgreementRepository::new(paths.agreements_file()),
            contracts: ContractRepository::new(paths.contracts_file()),
            amendments: AmendmentRepository::new(paths.amendments_file()),
            payments: PaymentRepository::new(paths.payments_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    /// Open and load in one step
    pub fn open(paths: ConvenioPaths) -> ConvenioResult<Self> {
        let storage = Self::new(paths)?;
        storage.load_all()?;
        Ok(storage)
    }

    pub fn paths(&self) -> &ConvenioPaths {
        &self.paths
    }

    pub fn load_all(&self) -> ConvenioResult<()> {
        self.companies.load()?;
        self.agreements.load()?;
        self.contracts.load()?;
        self.amendments.load()?;
        self.payments.load()?;
        Ok(())
    }

    pub fn save_all(&self) -> ConvenioResult<()> {
        self.companies.save()?;
        self.agreements.save()?;
        self.contracts.save()?;
        self.amendments.save()?;
        self.payments.save()?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.paths.settings_file().exists()
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        entity: &T,
    ) -> ConvenioResult<()> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    /// Record an update. When `diff` is `None` one is computed from the
    /// serialized snapshots.
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        diff: Option<String>,
    ) -> ConvenioResult<()> {
        let diff = diff.or_else(|| {
            let before = serde_json::to_value(before).ok()?;
            let after = serde_json::to_value(after).ok()?;
            generate_diff(&before, &after)
        });
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
            diff,
        ))
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        entity: &T,
    ) -> ConvenioResult<()> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }

    /// Record a prepared entry (e.g. one carrying an actor)
    pub fn log(&self, entry: AuditEntry) -> ConvenioResult<()> {
        self.audit.log(&entry)
    }

    /// Record several entries at once (cascading deletes)
    pub fn log_entries(&self, entries: &[AuditEntry]) -> ConvenioResult<()> {
        self.audit.log_batch(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use crate::models::{Agreement, AgreementType, Company, Money};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = ConvenioPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_storage_creation() {
        let (temp_dir, storage) = create_storage();
        assert!(temp_dir.path().join("data").exists());
        assert!(!storage.is_initialized());
    }

    #[test]
    fn test_save_and_reopen() {
        let (temp_dir, storage) = create_storage();
        storage
            .companies
            .upsert(Company::new("12.345.678/0001-90", "Alfa Ltda"))
            .unwrap();
        storage.save_all().unwrap();

        let reopened =
            Storage::open(ConvenioPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        assert_eq!(reopened.companies.count().unwrap(), 1);
        assert_eq!(reopened.agreements.count().unwrap(), 0);
    }

    #[test]
    fn test_large_amounts_survive_reopen() {
        let (temp_dir, storage) = create_storage();
        let mut agreement = Agreement::new(
            AgreementType::Federal,
            "Ministério da Saúde",
            "Hospital regional",
            NaiveDate::from_ymd_opt(2030, 12, 31).unwrap(),
        );
        agreement.transfer_amount = Money::MAX;
        agreement.counterpart_amount = Money::from_cents(1_234_567_890_123);
        storage.agreements.upsert(agreement.clone()).unwrap();
        storage.save_all().unwrap();

        let reopened =
            Storage::open(ConvenioPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        let loaded = reopened.agreements.get(agreement.id).unwrap().unwrap();
        assert_eq!(loaded.transfer_amount, Money::MAX);
        assert_eq!(loaded.counterpart_amount.cents(), 1_234_567_890_123);
    }

    #[test]
    fn test_log_update_computes_diff() {
        let (_temp_dir, storage) = create_storage();
        let before = Company::new("1", "Antiga");
        let mut after = before.clone();
        after.legal_name = "Nova".to_string();

        storage
            .log_update(
                EntityType::Company,
                after.id.to_string(),
                None,
                &before,
                &after,
                None,
            )
            .unwrap();

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries[0].operation, Operation::Update);
        assert!(entries[0]
            .diff_summary
            .as_deref()
            .unwrap()
            .contains("legal_name: \"Antiga\" -> \"Nova\""));
    }
}
