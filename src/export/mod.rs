//! Data export
//!
//! - CSV: the filtered agreement report and contract figures
//! - JSON: full database, machine-readable
//! - YAML: full database, human-readable

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::{export_contracts_csv, export_report_csv};
pub use json::{export_full_json, import_from_json, FullExport, EXPORT_SCHEMA_VERSION};
pub use yaml::{export_full_yaml, import_from_yaml};
