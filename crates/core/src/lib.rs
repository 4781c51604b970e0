//! # Form033 Core
//!
//! Grid-encoding engine for the Form033 dental record.
//!
//! This crate turns one patient's per-tooth, per-surface clinical findings into the fixed
//! positional grids printed on the form:
//! - [`position`] maps FDI tooth codes onto the permanent (4×8) and temporary (4×5) grids
//! - [`catalog`] is the symbol/color legend of the paper form
//! - [`resolver`] picks one representative finding per tooth
//! - [`attributes`] extracts mobility and gingival recession as ranked options
//! - [`grid`] orchestrates the above into charts
//! - [`stats`] derives the CPO-D / ceo-d indices from the charts
//! - [`service`] is the patient-level entry point used by the CLI and REST API
//!
//! **No wire concerns**: JSON/YAML models and the export document live in `form033-wire`.

pub mod attributes;
pub mod catalog;
pub mod cell;
pub mod config;
pub mod constants;
pub mod error;
pub mod grid;
pub mod model;
pub mod position;
pub mod resolver;
pub mod service;
pub mod stats;

pub use attributes::{RankedOption, RankedOptionResolver, StaticRankedOptions};
pub use cell::{AttributeCell, PrimaryCell};
pub use config::{CoreConfig, FacilityInfo};
pub use error::{Form033Error, Form033Result};
pub use grid::{Form033Chart, Grid, GridBuilder, PermanentChart, TemporaryChart};
pub use model::{
    AttributeBag, AttributeType, CatalogEntry, Finding, PatientHeader, PatientRecord, Surface,
    Tooth,
};
pub use service::{Form033Report, Form033Service, InMemoryPatientSource, PatientSource};

pub use form033_types::{Dentition, NonEmptyText, SurfaceLetter, ToothCode};
