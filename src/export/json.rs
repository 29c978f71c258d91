//! JSON export
//!
//! Dumps every entity to a single versioned document.

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConvenioError, ConvenioResult};
use crate::models::{Agreement, Amendment, Company, Contract, Payment};
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full database export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    /// Version of the application that wrote the export
    pub app_version: String,
    pub companies: Vec<Company>,
    pub agreements: Vec<Agreement>,
    pub contracts: Vec<Contract>,
    pub amendments: Vec<Amendment>,
    pub payments: Vec<Payment>,
    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub company_count: usize,
    pub agreement_count: usize,
    pub contract_count: usize,
    pub amendment_count: usize,
    pub payment_count: usize,
    /// Earliest validity end among agreements
    pub earliest_validity_end: Option<String>,
    /// Latest validity end among agreements
    pub latest_validity_end: Option<String>,
}

impl FullExport {
    pub fn from_storage(storage: &Storage) -> ConvenioResult<Self> {
        let companies = storage.companies.get_all()?;
        let agreements = storage.agreements.get_all()?;
        let contracts = storage.contracts.get_all()?;
        let amendments = storage.amendments.get_all()?;
        let payments = storage.payments.get_all()?;

        let ends = agreements.iter().map(|a| a.validity_end);
        let metadata = ExportMetadata {
            company_count: companies.len(),
            agreement_count: agreements.len(),
            contract_count: contracts.len(),
            amendment_count: amendments.len(),
            payment_count: payments.len(),
            earliest_validity_end: ends.clone().min().map(|d| d.to_string()),
            latest_validity_end: ends.max().map(|d| d.to_string()),
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            companies,
            agreements,
            contracts,
            amendments,
            payments,
            metadata,
        })
    }

    /// Check the schema version, each record's own rules (amount limits
    /// included) and that every reference resolves
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        for company in &self.companies {
            company.validate().map_err(|e| format!("Company {}: {}", company.id, e))?;
        }
        for agreement in &self.agreements {
            agreement.validate().map_err(|e| format!("Agreement {}: {}", agreement.id, e))?;
        }
        for contract in &self.contracts {
            contract.validate().map_err(|e| format!("Contract {}: {}", contract.id, e))?;
        }
        for amendment in &self.amendments {
            amendment.validate().map_err(|e| format!("Amendment {}: {}", amendment.id, e))?;
        }
        for payment in &self.payments {
            payment.validate().map_err(|e| format!("Payment {}: {}", payment.id, e))?;
        }

        let company_ids: HashSet<_> = self.companies.iter().map(|c| c.id).collect();
        let agreement_ids: HashSet<_> = self.agreements.iter().map(|a| a.id).collect();
        let contract_ids: HashSet<_> = self.contracts.iter().map(|c| c.id).collect();

        for contract in &self.contracts {
            if !agreement_ids.contains(&contract.agreement_id) {
                return Err(format!(
                    "Contract {} references unknown agreement {}",
                    contract.id, contract.agreement_id
                ));
            }
            if !company_ids.contains(&contract.company_id) {
                return Err(format!(
                    "Contract {} references unknown company {}",
                    contract.id, contract.company_id
                ));
            }
        }

        for amendment in &self.amendments {
            if !contract_ids.contains(&amendment.contract_id) {
                return Err(format!(
                    "Amendment {} references unknown contract {}",
                    amendment.id, amendment.contract_id
                ));
            }
        }

        for payment in &self.payments {
            if !contract_ids.contains(&payment.contract_id) {
                return Err(format!(
                    "Payment {} references unknown contract {}",
                    payment.id, payment.contract_id
                ));
            }
        }

        Ok(())
    }
}

/// Export the full database to JSON
pub fn export_full_json<W: Write>(storage: &Storage, writer: &mut W, pretty: bool) -> ConvenioResult<()> {
    let export = FullExport::from_storage(storage)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| ConvenioError::Export(e.to_string()))?;

    tracing::info!(agreements = export.metadata.agreement_count, "exported database as JSON");
    Ok(())
}

/// Parse and validate a JSON export
pub fn import_from_json(json_str: &str) -> ConvenioResult<FullExport> {
    let export: FullExport =
        serde_json::from_str(json_str).map_err(|e| ConvenioError::Export(e.to_string()))?;
    export.validate().map_err(ConvenioError::Export)?;
    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgreementType, Money};
    use crate::services::test_support::create_test_storage;
    use chrono::NaiveDate;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn populate(storage: &Storage) -> Contract {
        let company = Company::new("12.345.678/0001-90", "Alfa Ltda");
        let agreement = Agreement::new(AgreementType::Federal, "Ministério", "Obra", date(12, 31));
        let contract = Contract::new(
            agreement.id,
            company.id,
            "CT-1",
            "Obra",
            Money::from_cents(100_000),
            date(1, 10),
        );
        storage.companies.upsert(company).unwrap();
        storage.agreements.upsert(agreement).unwrap();
        storage.contracts.upsert(contract.clone()).unwrap();
        storage
            .payments
            .upsert(Payment::new(contract.id, date(2, 1), Money::from_cents(30_000)))
            .unwrap();
        contract
    }

    #[test]
    fn test_full_export() {
        let (_temp_dir, storage) = create_test_storage();
        populate(&storage);

        let export = FullExport::from_storage(&storage).unwrap();
        assert_eq!(export.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(export.metadata.agreement_count, 1);
        assert_eq!(export.metadata.payment_count, 1);
        assert_eq!(export.metadata.latest_validity_end.as_deref(), Some("2025-12-31"));
        assert!(export.validate().is_ok());
    }

    #[test]
    fn test_validate_catches_dangling_payment() {
        let (_temp_dir, storage) = create_test_storage();
        let contract = populate(&storage);

        let mut export = FullExport::from_storage(&storage).unwrap();
        export.contracts.retain(|c| c.id != contract.id);
        let err = export.validate().unwrap_err();
        assert!(err.contains("unknown contract"));
    }

    #[test]
    fn test_written_json_is_importable() {
        let (_temp_dir, storage) = create_test_storage();
        populate(&storage);

        let mut out = Vec::new();
        export_full_json(&storage, &mut out, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\"contracted_value\": 100000"));

        let imported = import_from_json(&text).unwrap();
        assert_eq!(imported.companies[0].legal_name, "Alfa Ltda");
    }

    #[test]
    fn test_import_rejects_amount_over_limit() {
        let (_temp_dir, storage) = create_test_storage();
        populate(&storage);

        let mut export = FullExport::from_storage(&storage).unwrap();
        export.agreements[0].transfer_amount = Money::from_cents(Money::MAX.cents() + 1);
        let text = serde_json::to_string(&export).unwrap();

        let err = import_from_json(&text).unwrap_err();
        assert!(err.to_string().contains("transfer_amount"), "{}", err);
    }

    #[test]
    fn test_import_rejects_other_schema() {
        let (_temp_dir, storage) = create_test_storage();
        let mut export = FullExport::from_storage(&storage).unwrap();
        export.schema_version = "0.1.0".into();
        let text = serde_json::to_string(&export).unwrap();
        assert!(import_from_json(&text).is_err());
    }
}
