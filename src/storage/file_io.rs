//! Entity data files
//!
//! Each file is a `{"entity": ..., "records": [...]}` envelope. Writes go
//! through a sibling temp file and a rename, so a crash leaves either the old
//! file or the new one.

use std::collections::HashSet;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConvenioError;

use super::repository::Record;

#[derive(Serialize)]
struct RecordFileOut<'a, T> {
    entity: &'static str,
    records: &'a [T],
}

/// Header of a records file, read before the records themselves
#[derive(Deserialize)]
struct RecordFileHeader {
    /// Absent in files written before the header existed
    #[serde(default)]
    entity: Option<String>,
}

#[derive(Deserialize)]
struct RecordFileIn<T> {
    records: Vec<T>,
}

/// Load the records of one entity. A missing file holds no records.
pub fn load_records<T: Record>(path: &Path) -> Result<Vec<T>, ConvenioError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let raw = fs::read_to_string(path).map_err(|e| storage_error::<T>("read", path, e))?;
    let corrupt = |e: serde_json::Error| {
        ConvenioError::Storage(format!(
            "Corrupt {} file {} (line {}, column {}): {}",
            T::ENTITY,
            path.display(),
            e.line(),
            e.column(),
            e
        ))
    };

    let header: RecordFileHeader = serde_json::from_str(&raw).map_err(corrupt)?;
    if let Some(entity) = header.entity.as_deref() {
        if entity != T::ENTITY {
            return Err(ConvenioError::Storage(format!(
                "{} holds {} records, expected {}",
                path.display(),
                entity,
                T::ENTITY
            )));
        }
    }

    let parsed: RecordFileIn<T> = serde_json::from_str(&raw).map_err(corrupt)?;

    let mut seen = HashSet::with_capacity(parsed.records.len());
    for record in &parsed.records {
        if !seen.insert(record.id()) {
            return Err(ConvenioError::Storage(format!(
                "Duplicate {} {} in {}",
                T::ENTITY,
                record.id(),
                path.display()
            )));
        }
    }

    Ok(parsed.records)
}

/// Replace the records file of one entity atomically
pub fn save_records<T: Record>(path: &Path, records: &[T]) -> Result<(), ConvenioError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| storage_error::<T>("create directory for", parent, e))?;
    }

    let temp_path = temp_path(path);
    let file = File::create(&temp_path).map_err(|e| storage_error::<T>("create", &temp_path, e))?;

    let mut writer = BufWriter::new(file);
    let envelope = RecordFileOut {
        entity: T::ENTITY,
        records,
    };
    serde_json::to_writer_pretty(&mut writer, &envelope)
        .map_err(|e| storage_error::<T>("serialize", path, e))?;
    writer
        .flush()
        .and_then(|_| writer.get_ref().sync_all())
        .map_err(|e| storage_error::<T>("flush", &temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        storage_error::<T>("replace", path, e)
    })?;

    tracing::trace!(entity = T::ENTITY, count = records.len(), path = %path.display(), "records written");
    Ok(())
}

fn storage_error<T: Record>(action: &str, target: &Path, err: impl fmt::Display) -> ConvenioError {
    ConvenioError::Storage(format!(
        "Cannot {} {} file {}: {}",
        action,
        T::ENTITY,
        target.display(),
        err
    ))
}

/// `agreements.json` -> `agreements.json.tmp`, in the same directory so the
/// rename stays on one filesystem
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
