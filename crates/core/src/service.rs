//! Patient-level Form033 generation.
//!
//! [`Form033Service`] loads a patient through a [`PatientSource`], builds both charts and the
//! dental indices, and stamps the result with the catalog revision. It holds no mutable state and
//! can be shared across threads behind an `Arc`.

use crate::attributes::RankedOptionResolver;
use crate::config::{CoreConfig, FacilityInfo};
use crate::constants::CATALOG_REVISION;
use crate::grid::{Form033Chart, GridBuilder};
use crate::model::{PatientHeader, PatientRecord};
use crate::stats::DentalIndices;
use crate::{Form033Error, Form033Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Where patient snapshots come from.
///
/// `Ok(None)` means the patient does not exist; `Err` is reserved for sources that failed to load
/// an existing record.
pub trait PatientSource {
    fn load(&self, patient_id: Uuid) -> Form033Result<Option<PatientRecord>>;
}

impl<T: PatientSource + ?Sized> PatientSource for Arc<T> {
    fn load(&self, patient_id: Uuid) -> Form033Result<Option<PatientRecord>> {
        (**self).load(patient_id)
    }
}

/// Patient snapshots held in memory, keyed by patient id.
#[derive(Clone, Debug, Default)]
pub struct InMemoryPatientSource {
    records: HashMap<Uuid, PatientRecord>,
}

impl InMemoryPatientSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, replacing any previous record with the same id.
    pub fn insert(&mut self, record: PatientRecord) {
        self.records.insert(record.id, record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.records.keys().copied()
    }
}

impl FromIterator<PatientRecord> for InMemoryPatientSource {
    fn from_iter<I: IntoIterator<Item = PatientRecord>>(iter: I) -> Self {
        let mut source = Self::new();
        for record in iter {
            source.insert(record);
        }
        source
    }
}

impl PatientSource for InMemoryPatientSource {
    fn load(&self, patient_id: Uuid) -> Form033Result<Option<PatientRecord>> {
        Ok(self.records.get(&patient_id).cloned())
    }
}

/// A generated Form033 for one patient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Form033Report {
    pub patient_id: Uuid,
    pub header: PatientHeader,
    pub facility: FacilityInfo,
    pub chart: Form033Chart,
    pub indices: DentalIndices,
    pub catalog_revision: u32,
    pub generated_at: DateTime<Utc>,
}

pub struct Form033Service<S, O> {
    cfg: Arc<CoreConfig>,
    source: S,
    builder: GridBuilder<O>,
}

impl<S: PatientSource, O: RankedOptionResolver> Form033Service<S, O> {
    pub fn new(cfg: Arc<CoreConfig>, source: S, options: O) -> Self {
        Self {
            cfg,
            source,
            builder: GridBuilder::new(options),
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn builder(&self) -> &GridBuilder<O> {
        &self.builder
    }

    /// Generates the form for a stored patient.
    ///
    /// # Errors
    ///
    /// Returns [`Form033Error::UnknownPatient`] if the source has no such patient,
    /// [`Form033Error::EmptyToothSet`] if the patient has no teeth recorded, or the source's own
    /// error if loading failed.
    pub fn generate(&self, patient_id: Uuid) -> Form033Result<Form033Report> {
        let record = self
            .source
            .load(patient_id)?
            .ok_or(Form033Error::UnknownPatient(patient_id))?;
        self.generate_for_record(&record)
    }

    /// Generates the form for a snapshot supplied by the caller.
    pub fn generate_for_record(&self, record: &PatientRecord) -> Form033Result<Form033Report> {
        self.generate_for_record_at(record, Utc::now())
    }

    pub fn generate_for_record_at(
        &self,
        record: &PatientRecord,
        generated_at: DateTime<Utc>,
    ) -> Form033Result<Form033Report> {
        if record.teeth.is_empty() {
            return Err(Form033Error::EmptyToothSet(record.id));
        }

        let chart = self.builder.build(&record.teeth);
        let indices = DentalIndices::from_chart(&chart, &record.teeth);
        tracing::debug!(
            patient_id = %record.id,
            teeth = record.teeth.len(),
            permanent_cells = chart.permanent.diagnosis.populated(),
            temporary_cells = chart.temporary.diagnosis.populated(),
            "form033 generated"
        );

        Ok(Form033Report {
            patient_id: record.id,
            header: record.header.clone(),
            facility: self.cfg.facility().clone(),
            chart,
            indices,
            catalog_revision: CATALOG_REVISION,
            generated_at,
        })
    }
}
