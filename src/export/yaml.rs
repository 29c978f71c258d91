//! YAML export
//!
//! Same document as the JSON export, for human reading and hand edits.

use std::io::Write;

use crate::error::{ConvenioError, ConvenioResult};
use crate::export::json::FullExport;
use crate::storage::Storage;

fn export_err(e: impl std::fmt::Display) -> ConvenioError {
    ConvenioError::Export(e.to_string())
}

/// Export the full database to YAML
pub fn export_full_yaml<W: Write>(storage: &Storage, writer: &mut W) -> ConvenioResult<()> {
    let export = FullExport::from_storage(storage)?;

    writeln!(writer, "# Convenios full database export").map_err(export_err)?;
    writeln!(writer, "# Generated: {}", export.exported_at).map_err(export_err)?;
    writeln!(writer, "# App Version: {}", export.app_version).map_err(export_err)?;
    writeln!(writer).map_err(export_err)?;

    serde_yaml::to_writer(writer, &export).map_err(export_err)?;

    tracing::info!(agreements = export.metadata.agreement_count, "exported database as YAML");
    Ok(())
}

/// Parse and validate a YAML export
pub fn import_from_yaml(yaml_str: &str) -> ConvenioResult<FullExport> {
    let export: FullExport = serde_yaml::from_str(yaml_str).map_err(export_err)?;
    export.validate().map_err(ConvenioError::Export)?;
    Ok(export)
}
