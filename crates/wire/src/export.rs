//! Form033 export document.
//!
//! The export is the value handed to downstream renderers (PDF, SVG) and stored alongside the
//! patient record. Grids are arrays of rows of nullable cells, in the layout of the printed form.

use crate::{schema_mismatch, WireError, WireResult};
use form033_core::cell::{AttributeCell, PrimaryCell};
use form033_core::grid::Grid;
use form033_core::position::{code_at, dimensions};
use form033_core::stats::DentalIndices;
use form033_core::Form033Report;
use form033_types::{Dentition, SurfaceLetter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ExportDocument {
    pub catalog_revision: u32,
    /// RFC 3339 timestamp.
    pub generated_at: String,
    pub patient_section: PatientSectionWire,
    pub permanent_chart: PermanentChartWire,
    pub temporary_chart: TemporaryChartWire,
    pub indices: IndicesWire,
}

/// Section A of the form: facility and patient identification.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PatientSectionWire {
    pub patient_id: String,
    pub establishment: String,
    pub province: String,
    pub canton: String,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub given_names: Option<String>,
    #[serde(default)]
    pub family_names: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    /// Age in years on the generation date.
    #[serde(default)]
    pub age: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PermanentChartWire {
    pub teeth: Vec<Vec<Option<PrimaryCellWire>>>,
    pub mobility: Vec<Vec<Option<AttributeCellWire>>>,
    pub recession: Vec<Vec<Option<AttributeCellWire>>>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct TemporaryChartWire {
    pub teeth: Vec<Vec<Option<PrimaryCellWire>>>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PrimaryCellWire {
    pub tooth: String,
    pub symbol_key: String,
    pub glyph: String,
    pub color: String,
    pub category: String,
    pub semantic_type: String,
    pub description: String,
    pub render_priority: u8,
    /// Subset of V, L, D, M, O in drawing order.
    pub surfaces: Vec<String>,
    #[serde(default)]
    pub diagnosis_key: Option<String>,
    #[serde(default)]
    pub source_finding_id: Option<String>,
    #[serde(default)]
    pub source_recorded_at: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AttributeCellWire {
    pub tooth: String,
    pub rank: u32,
    #[serde(default)]
    pub key: Option<String>,
    pub name: String,
    pub priority: i32,
    pub defaulted: bool,
    pub source_finding_id: String,
    pub source_recorded_at: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct IndicesWire {
    pub cpo: CpoWire,
    pub ceo: CeoWire,
    pub risk: String,
    pub permanent_with_diagnosis: u32,
    pub temporary_with_diagnosis: u32,
    pub healthy: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CpoWire {
    pub c: u32,
    pub p: u32,
    pub o: u32,
    pub total: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CeoWire {
    pub c: u32,
    pub e: u32,
    pub o: u32,
    pub total: u32,
}

// ============================================================================
// Public export operations
// ============================================================================

/// Export operations.
///
/// This is a zero-sized type used for namespacing export-related operations.
pub struct Form033Export;

impl Form033Export {
    /// Translate a generated report into the export document.
    pub fn render(report: &Form033Report) -> ExportDocument {
        report_to_wire(report)
    }

    pub fn to_json(report: &Form033Report, pretty: bool) -> WireResult<String> {
        let doc = report_to_wire(report);
        Ok(if pretty {
            serde_json::to_string_pretty(&doc)?
        } else {
            serde_json::to_string(&doc)?
        })
    }

    pub fn to_yaml(report: &Form033Report) -> WireResult<String> {
        Ok(serde_yaml::to_string(&report_to_wire(report))?)
    }
}

/// Checks that an export document is structurally sound.
///
/// The document must match the wire schema, both charts must be present with grids of the form's
/// shape (4×8 permanent, 4×5 temporary), and every populated cell must sit at its tooth's
/// position with surfaces drawn from V, L, D, M, O.
///
/// # Errors
///
/// Returns [`WireError::Translation`] on a schema mismatch (with the failing field path) and
/// [`WireError::InvalidExport`] on a structural problem.
pub fn validate_export(json: &str) -> WireResult<ExportDocument> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    let doc = serde_path_to_error::deserialize::<_, ExportDocument>(&mut deserializer)
        .map_err(|e| WireError::Translation(schema_mismatch("Export", e)))?;

    check_grid(
        "permanent_chart.teeth",
        Dentition::Permanent,
        &doc.permanent_chart.teeth,
        |c| c.tooth.as_str(),
    )?;
    check_grid(
        "permanent_chart.mobility",
        Dentition::Permanent,
        &doc.permanent_chart.mobility,
        |c| c.tooth.as_str(),
    )?;
    check_grid(
        "permanent_chart.recession",
        Dentition::Permanent,
        &doc.permanent_chart.recession,
        |c| c.tooth.as_str(),
    )?;
    check_grid(
        "temporary_chart.teeth",
        Dentition::Temporary,
        &doc.temporary_chart.teeth,
        |c| c.tooth.as_str(),
    )?;

    for (name, grid) in [
        ("permanent_chart.teeth", &doc.permanent_chart.teeth),
        ("temporary_chart.teeth", &doc.temporary_chart.teeth),
    ] {
        for cell in grid.iter().flatten().flatten() {
            if let Some(bad) = cell
                .surfaces
                .iter()
                .find(|s| !matches!(s.as_str(), "V" | "L" | "D" | "M" | "O"))
            {
                return Err(WireError::InvalidExport(format!(
                    "{name}: tooth {} has unknown surface '{bad}'",
                    cell.tooth
                )));
            }
        }
    }

    Ok(doc)
}

fn check_grid<T>(
    name: &str,
    dentition: Dentition,
    rows: &[Vec<Option<T>>],
    tooth_of: impl Fn(&T) -> &str,
) -> WireResult<()> {
    let (expected_rows, expected_cols) = dimensions(dentition);
    if rows.len() != expected_rows {
        return Err(WireError::InvalidExport(format!(
            "{name}: expected {expected_rows} rows, found {}",
            rows.len()
        )));
    }
    for (r, row) in rows.iter().enumerate() {
        if row.len() != expected_cols {
            return Err(WireError::InvalidExport(format!(
                "{name}[{r}]: expected {expected_cols} columns, found {}",
                row.len()
            )));
        }
        for (c, cell) in row.iter().enumerate() {
            let Some(cell) = cell else { continue };
            let expected = code_at(dentition, r, c).map(|code| code.to_string());
            if expected.as_deref() != Some(tooth_of(cell)) {
                return Err(WireError::InvalidExport(format!(
                    "{name}[{r}][{c}]: tooth {} is not at its form position",
                    tooth_of(cell)
                )));
            }
        }
    }
    Ok(())
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn grid_to_wire<T, W, const R: usize, const C: usize>(
    grid: &Grid<T, R, C>,
    f: impl Fn(&T) -> W,
) -> Vec<Vec<Option<W>>> {
    grid.rows()
        .iter()
        .map(|row| row.iter().map(|cell| cell.as_ref().map(&f)).collect())
        .collect()
}

fn primary_to_wire(cell: &PrimaryCell) -> PrimaryCellWire {
    PrimaryCellWire {
        tooth: cell.tooth.to_string(),
        symbol_key: cell.symbol.key.to_string(),
        glyph: cell.symbol.glyph.to_string(),
        color: cell.symbol.color.to_string(),
        category: cell.symbol.category.as_str().to_string(),
        semantic_type: cell.symbol.kind.as_str().to_string(),
        description: cell.symbol.description.to_string(),
        render_priority: cell.symbol.render_priority,
        surfaces: cell
            .surfaces
            .iter()
            .map(SurfaceLetter::to_string)
            .collect(),
        diagnosis_key: cell.diagnosis_key.as_ref().map(|k| k.as_str().to_string()),
        source_finding_id: cell.source_finding.map(|id| id.to_string()),
        source_recorded_at: cell.source_recorded_at.map(|ts| ts.to_rfc3339()),
    }
}

fn attribute_to_wire(cell: &AttributeCell) -> AttributeCellWire {
    AttributeCellWire {
        tooth: cell.tooth.to_string(),
        rank: cell.rank,
        key: cell.key.as_ref().map(|k| k.as_str().to_string()),
        name: cell.name.clone(),
        priority: cell.priority,
        defaulted: cell.is_default(),
        source_finding_id: cell.source_finding.to_string(),
        source_recorded_at: cell.source_recorded_at.to_rfc3339(),
    }
}

fn indices_to_wire(indices: &DentalIndices) -> IndicesWire {
    IndicesWire {
        cpo: CpoWire {
            c: indices.cpo.decayed,
            p: indices.cpo.missing,
            o: indices.cpo.filled,
            total: indices.cpo.total(),
        },
        ceo: CeoWire {
            c: indices.ceo.decayed,
            e: indices.ceo.extraction_indicated,
            o: indices.ceo.filled,
            total: indices.ceo.total(),
        },
        risk: indices.risk().label().to_string(),
        permanent_with_diagnosis: indices.permanent_with_diagnosis,
        temporary_with_diagnosis: indices.temporary_with_diagnosis,
        healthy: indices.healthy,
    }
}

fn report_to_wire(report: &Form033Report) -> ExportDocument {
    let header = &report.header;
    ExportDocument {
        catalog_revision: report.catalog_revision,
        generated_at: report.generated_at.to_rfc3339(),
        patient_section: PatientSectionWire {
            patient_id: report.patient_id.to_string(),
            establishment: report.facility.establishment.clone(),
            province: report.facility.province.clone(),
            canton: report.facility.canton.clone(),
            national_id: header.national_id.clone(),
            given_names: header.given_names.clone(),
            family_names: header.family_names.clone(),
            sex: header.sex.clone(),
            birth_date: header.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
            age: header.age_on(report.generated_at.date_naive()),
        },
        permanent_chart: PermanentChartWire {
            teeth: grid_to_wire(&report.chart.permanent.diagnosis, primary_to_wire),
            mobility: grid_to_wire(&report.chart.permanent.mobility, attribute_to_wire),
            recession: grid_to_wire(&report.chart.permanent.recession, attribute_to_wire),
        },
        temporary_chart: TemporaryChartWire {
            teeth: grid_to_wire(&report.chart.temporary.diagnosis, primary_to_wire),
        },
        indices: indices_to_wire(&report.indices),
    }
}
