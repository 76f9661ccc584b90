//! CSV and JSON artefact writers.

use std::{fs::File, path::Path};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use crate::error::Result;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Serialise homogeneous rows with a derived header.
pub fn write_records<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "wrote table");
    Ok(())
}

/// Write rows whose leading columns are passed through from the input table.
///
/// Every row must carry the same passthrough keys as the first one; missing
/// values are written empty.
pub fn write_with_passthrough(
    path: &Path,
    passthrough: &[&IndexMap<String, String>],
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<()> {
    ensure_parent(path)?;
    let extra_keys: Vec<&String> = passthrough
        .first()
        .map(|first| first.keys().collect())
        .unwrap_or_default();
    let mut writer = csv::Writer::from_path(path)?;
    let mut header: Vec<&str> = extra_keys.iter().map(|k| k.as_str()).collect();
    header.extend_from_slice(headers);
    writer.write_record(&header)?;
    for (extra, row) in passthrough.iter().zip(rows) {
        let mut record: Vec<&str> = extra_keys
            .iter()
            .map(|k| extra.get(*k).map(String::as_str).unwrap_or(""))
            .collect();
        record.extend(row.iter().map(String::as_str));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "wrote table");
    Ok(())
}

/// Pretty-print a JSON document.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    info!(path = %path.display(), "wrote json");
    Ok(())
}
