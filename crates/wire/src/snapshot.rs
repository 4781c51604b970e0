//! Patient snapshot wire models and translation helpers.
//!
//! A snapshot is one patient's full tooth collection as exported by the clinical record system:
//! patient header, teeth, surfaces and the findings recorded on each surface.
//!
//! Responsibilities:
//! - Define a strict wire model for JSON and YAML snapshots
//! - Translate between the wire model and [`PatientRecord`]
//! - Type the attribute bag at the boundary (known attribute names must carry non-empty strings)

use crate::{schema_mismatch, WireError, WireResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use form033_core::model::{
    AttributeBag, AttributeType, CatalogEntry, Finding, PatientHeader, PatientRecord, Surface,
    Tooth,
};
use form033_types::{NonEmptyText, ToothCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use utoipa::ToSchema;
use uuid::Uuid;

/// Text format of a snapshot file or body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    /// Guess the format from a file extension (`.json`, `.yaml`, `.yml`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

// ============================================================================
// Public Snapshot operations
// ============================================================================

/// Snapshot operations.
///
/// This is a zero-sized type used for namespacing snapshot-related operations.
pub struct Snapshot;

impl Snapshot {
    /// Parse a snapshot in the given format.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::Translation`] if:
    /// - the text does not match the wire schema (the message carries the failing field path),
    /// - any unknown keys are present,
    /// - an identifier, timestamp, date or tooth code is malformed,
    /// - a known attribute carries a non-string or blank value.
    pub fn parse(text: &str, format: SnapshotFormat) -> WireResult<PatientRecord> {
        let wire = match format {
            SnapshotFormat::Json => {
                let mut deserializer = serde_json::Deserializer::from_str(text);
                serde_path_to_error::deserialize::<_, SnapshotDocument>(&mut deserializer)
                    .map_err(|e| WireError::Translation(schema_mismatch("Snapshot", e)))?
            }
            SnapshotFormat::Yaml => {
                let deserializer = serde_yaml::Deserializer::from_str(text);
                serde_path_to_error::deserialize::<_, SnapshotDocument>(deserializer)
                    .map_err(|e| WireError::Translation(schema_mismatch("Snapshot", e)))?
            }
        };
        wire_to_domain(wire)
    }

    pub fn parse_json(text: &str) -> WireResult<PatientRecord> {
        Self::parse(text, SnapshotFormat::Json)
    }

    pub fn parse_yaml(text: &str) -> WireResult<PatientRecord> {
        Self::parse(text, SnapshotFormat::Yaml)
    }

    /// Read and parse a snapshot file, choosing the format from its extension.
    pub fn read(path: &Path) -> WireResult<PatientRecord> {
        let format = SnapshotFormat::from_path(path).ok_or_else(|| {
            WireError::InvalidInput(format!(
                "cannot tell snapshot format of {} (expected .json, .yaml or .yml)",
                path.display()
            ))
        })?;
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, format)
    }

    /// Render a patient record as snapshot text.
    pub fn render(record: &PatientRecord, format: SnapshotFormat) -> WireResult<String> {
        let wire = domain_to_wire(record);
        Ok(match format {
            SnapshotFormat::Json => serde_json::to_string_pretty(&wire)?,
            SnapshotFormat::Yaml => serde_yaml::to_string(&wire)?,
        })
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// Wire representation of a patient snapshot.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SnapshotDocument {
    pub patient: PatientWire,

    #[serde(default)]
    pub teeth: Vec<ToothWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PatientWire {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_names: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_names: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,

    /// ISO 8601 date (YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ToothWire {
    /// Two-digit FDI code, e.g. "18".
    pub code: String,

    #[serde(default)]
    pub absent: bool,

    #[serde(default)]
    pub surfaces: Vec<SurfaceWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SurfaceWire {
    pub name: String,

    #[serde(default)]
    pub findings: Vec<FindingWire>,
}

fn default_active() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct FindingWire {
    pub id: String,

    /// RFC 3339 timestamp.
    pub recorded_at: String,

    #[serde(default = "default_active")]
    pub active: bool,

    pub diagnosis: DiagnosisWire,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    #[schema(value_type = Object)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct DiagnosisWire {
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub priority: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_key: Option<String>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn translation(at: &str, msg: impl std::fmt::Display) -> WireError {
    WireError::Translation(format!("{at}: {msg}"))
}

fn parse_uuid(at: &str, value: &str) -> WireResult<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|e| translation(at, format!("invalid UUID: {e}")))
}

/// RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.f]` taken as UTC.
fn parse_timestamp(at: &str, value: &str) -> WireResult<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| translation(at, format!("invalid timestamp '{value}': {e}")))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn wire_to_attributes(
    at: &str,
    wire: BTreeMap<String, serde_json::Value>,
) -> WireResult<AttributeBag> {
    let mut bag = AttributeBag::new();
    for (name, value) in wire {
        let known = AttributeType::from_attribute_name(&name).is_some();
        let text = match value {
            serde_json::Value::String(s) => s,
            other if known => {
                return Err(translation(
                    &format!("{at}.{name}"),
                    format!("expected an option key string, got {other}"),
                ))
            }
            other => other.to_string(),
        };
        bag.insert_raw(&name, &text)
            .map_err(|e| translation(&format!("{at}.{name}"), e))?;
    }
    Ok(bag)
}

fn wire_to_finding(at: &str, wire: FindingWire) -> WireResult<Finding> {
    let key = NonEmptyText::new(&wire.diagnosis.key)
        .map_err(|e| translation(&format!("{at}.diagnosis.key"), e))?;
    let mut diagnosis = CatalogEntry::new(key, wire.diagnosis.priority);
    diagnosis.name = non_blank(wire.diagnosis.name);
    diagnosis.symbol_key = non_blank(wire.diagnosis.symbol_key);

    Ok(Finding {
        id: parse_uuid(&format!("{at}.id"), &wire.id)?,
        diagnosis,
        recorded_at: parse_timestamp(&format!("{at}.recorded_at"), &wire.recorded_at)?,
        active: wire.active,
        attributes: wire_to_attributes(&format!("{at}.attributes"), wire.attributes)?,
    })
}

fn wire_to_tooth(at: &str, wire: ToothWire) -> WireResult<Tooth> {
    let code =
        ToothCode::parse(&wire.code).map_err(|e| translation(&format!("{at}.code"), e))?;

    let surfaces = wire
        .surfaces
        .into_iter()
        .enumerate()
        .map(|(s, surface)| {
            let at = format!("{at}.surfaces[{s}]");
            let findings = surface
                .findings
                .into_iter()
                .enumerate()
                .map(|(f, finding)| wire_to_finding(&format!("{at}.findings[{f}]"), finding))
                .collect::<WireResult<Vec<_>>>()?;
            Ok(Surface {
                name: surface.name,
                findings,
            })
        })
        .collect::<WireResult<Vec<_>>>()?;

    Ok(Tooth {
        code,
        absent: wire.absent,
        surfaces,
    })
}

/// Convert a wire snapshot to the domain record.
pub(crate) fn wire_to_domain(wire: SnapshotDocument) -> WireResult<PatientRecord> {
    let id = parse_uuid("patient.id", &wire.patient.id)?;
    let birth_date = non_blank(wire.patient.birth_date)
        .map(|d| {
            NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                .map_err(|e| translation("patient.birth_date", format!("invalid date '{d}': {e}")))
        })
        .transpose()?;

    let header = PatientHeader {
        national_id: non_blank(wire.patient.national_id),
        given_names: non_blank(wire.patient.given_names),
        family_names: non_blank(wire.patient.family_names),
        sex: non_blank(wire.patient.sex),
        birth_date,
    };

    let teeth = wire
        .teeth
        .into_iter()
        .enumerate()
        .map(|(i, tooth)| wire_to_tooth(&format!("teeth[{i}]"), tooth))
        .collect::<WireResult<Vec<_>>>()?;

    Ok(PatientRecord { id, header, teeth })
}

fn finding_to_wire(finding: &Finding) -> FindingWire {
    let mut attributes: BTreeMap<String, serde_json::Value> = finding
        .attributes
        .other()
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect();
    for (attribute, value) in finding.attributes.typed() {
        attributes.insert(
            attribute.attribute_name().to_string(),
            serde_json::Value::String(value.as_str().to_string()),
        );
    }

    FindingWire {
        id: finding.id.to_string(),
        recorded_at: finding.recorded_at.to_rfc3339(),
        active: finding.active,
        diagnosis: DiagnosisWire {
            key: finding.diagnosis.key.as_str().to_string(),
            name: finding.diagnosis.name.clone(),
            priority: finding.diagnosis.priority,
            symbol_key: finding.diagnosis.symbol_key.clone(),
        },
        attributes,
    }
}

/// Convert a domain record to the wire snapshot.
pub(crate) fn domain_to_wire(record: &PatientRecord) -> SnapshotDocument {
    SnapshotDocument {
        patient: PatientWire {
            id: record.id.to_string(),
            national_id: record.header.national_id.clone(),
            given_names: record.header.given_names.clone(),
            family_names: record.header.family_names.clone(),
            sex: record.header.sex.clone(),
            birth_date: record
                .header
                .birth_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
        },
        teeth: record
            .teeth
            .iter()
            .map(|tooth| ToothWire {
                code: tooth.code.to_string(),
                absent: tooth.absent,
                surfaces: tooth
                    .surfaces
                    .iter()
                    .map(|s| SurfaceWire {
                        name: s.name.clone(),
                        findings: s.findings.iter().map(finding_to_wire).collect(),
                    })
                    .collect(),
            })
            .collect(),
    }
}
