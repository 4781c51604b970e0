//! Form033 wire/boundary support.
//!
//! This crate provides **wire models** and **format/translation helpers** around the engine:
//! - patient snapshots (JSON or YAML) going in
//! - the Form033 export document (JSON or YAML) coming out
//! - legend and grid layout reference documents
//! - loading a directory of snapshots as a patient source
//!
//! Wire structs are strict (`deny_unknown_fields`) and schema mismatches report the path of the
//! failing field. Domain types live in `form033-core`; nothing here makes clinical decisions.

pub mod directory;
pub mod export;
pub mod reference;
pub mod snapshot;

pub use directory::load_patient_dir;
pub use export::{validate_export, ExportDocument, Form033Export};
pub use reference::{layout_document, legend_document, LayoutDocument, LegendDocument};
pub use snapshot::{Snapshot, SnapshotDocument, SnapshotFormat};

/// Errors returned by the `form033-wire` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("invalid export: {0}")]
    InvalidExport(String),
}

/// Type alias for Results that can fail with a [`WireError`].
pub type WireResult<T> = Result<T, WireError>;

/// Formats a `serde_path_to_error` failure as "`{what}` schema mismatch at {path}: {source}".
pub(crate) fn schema_mismatch<E: std::fmt::Display>(
    what: &str,
    err: serde_path_to_error::Error<E>,
) -> String {
    let path = err.path().to_string();
    let source = err.into_inner();
    let path = if path.is_empty() || path == "." {
        "<root>"
    } else {
        path.as_str()
    };
    format!("{what} schema mismatch at {path}: {source}")
}
