//! Populated grid cells handed to renderers and exporters.

use crate::catalog::{self, SymbolEntry};
use crate::model::AttributeType;
use chrono::{DateTime, Utc};
use form033_types::{NonEmptyText, SurfaceLetter, ToothCode};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Primary diagnosis cell of one tooth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimaryCell {
    pub tooth: ToothCode,
    pub symbol: &'static SymbolEntry,
    pub surfaces: BTreeSet<SurfaceLetter>,
    /// Catalog key of the representative finding; `None` for absent teeth.
    pub diagnosis_key: Option<NonEmptyText>,
    pub source_finding: Option<Uuid>,
    pub source_recorded_at: Option<DateTime<Utc>>,
}

impl PrimaryCell {
    /// The fixed absent-tooth encoding: no surfaces and no source finding.
    pub fn absent(tooth: ToothCode) -> Self {
        Self {
            tooth,
            symbol: catalog::absent(),
            surfaces: BTreeSet::new(),
            diagnosis_key: None,
            source_finding: None,
            source_recorded_at: None,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.source_finding.is_none() && self.symbol == catalog::absent()
    }
}

/// Resolved mobility or recession value of one tooth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeCell {
    pub tooth: ToothCode,
    pub attribute: AttributeType,
    pub rank: u32,
    /// Option key; `None` when the value was defaulted.
    pub key: Option<NonEmptyText>,
    pub name: String,
    pub priority: i32,
    pub source_finding: Uuid,
    pub source_recorded_at: DateTime<Utc>,
}

impl AttributeCell {
    pub fn is_default(&self) -> bool {
        self.key.is_none()
    }
}
