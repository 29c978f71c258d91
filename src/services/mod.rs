//! Service layer
//!
//! Business rules on top of the storage layer: validation, derived
//! financial figures, cascading deletes and audit logging.

pub mod agreement;
pub mod amendment;
pub mod company;
pub mod contract;
pub mod payment;

pub use agreement::{AgreementDetail, AgreementInput, AgreementService, AgreementSummary};
pub use amendment::{AmendmentInput, AmendmentService};
pub use company::CompanyService;
pub use contract::{ContractInput, ContractService, ContractSummary};
pub use payment::{PaymentInput, PaymentService};

/// Trim an optional text field; blank becomes `None`
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod test_support {
    use tempfile::TempDir;

    use crate::config::paths::ConvenioPaths;
    use crate::storage::Storage;

    pub fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = ConvenioPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }
}

#[cfg(test)]
mod tests {
    use super::clean;

    #[test]
    fn test_clean() {
        assert_eq!(clean(Some("  x ".into())), Some("x".to_string()));
        assert_eq!(clean(Some("   ".into())), None);
        assert_eq!(clean(None), None);
    }
}
