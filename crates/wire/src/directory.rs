//! Directory of patient snapshots used as a patient source.
//!
//! Every `.json`, `.yaml` or `.yml` file directly under the directory is parsed at load time.
//! Other files and subdirectories are ignored.

use crate::snapshot::{Snapshot, SnapshotFormat};
use crate::{WireError, WireResult};
use form033_core::InMemoryPatientSource;
use std::path::Path;

/// Load all snapshots under `dir` into an in-memory patient source.
///
/// Files are read in name order; if two files carry the same patient id, the later one wins.
///
/// # Errors
///
/// Returns [`WireError::Io`] if the directory cannot be read and [`WireError::Translation`] (with
/// the offending file name) if any snapshot fails to parse.
pub fn load_patient_dir(dir: &Path) -> WireResult<InMemoryPatientSource> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && SnapshotFormat::from_path(&path).is_some() {
            files.push(path);
        }
    }
    files.sort();

    let mut source = InMemoryPatientSource::new();
    for path in files {
        let record = Snapshot::read(&path).map_err(|e| match e {
            WireError::Translation(msg) => {
                WireError::Translation(format!("{}: {msg}", path.display()))
            }
            other => other,
        })?;
        if source.ids().any(|id| id == record.id) {
            tracing::warn!(
                patient_id = %record.id,
                file = %path.display(),
                "duplicate patient snapshot; replacing earlier file"
            );
        }
        source.insert(record);
    }

    tracing::info!(
        dir = %dir.display(),
        patients = source.len(),
        "loaded patient snapshots"
    );
    Ok(source)
}
