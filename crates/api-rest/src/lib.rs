//! # API REST
//!
//! REST API for the Form033 engine.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON bodies, status codes, CORS)
//!
//! The engine runs in-process; this crate owns no persistence. Stored patients come from a
//! directory of snapshots loaded once at startup.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use form033_core::config::core_config_from_env_values;
use form033_core::constants::CATALOG_REVISION;
use form033_core::{
    CoreConfig, Form033Error, Form033Service, InMemoryPatientSource, StaticRankedOptions,
};
use form033_wire::{
    export, load_patient_dir, reference, snapshot, ExportDocument, Form033Export, LegendDocument,
    Snapshot, SnapshotDocument, WireError,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

type Service = Form033Service<InMemoryPatientSource, StaticRankedOptions>;

/// Application state for the REST API server.
///
/// Shared by every handler; the service is immutable once built.
#[derive(Clone)]
pub struct AppState {
    service: Arc<Service>,
}

impl AppState {
    pub fn new(cfg: Arc<CoreConfig>, patients: InMemoryPatientSource) -> Self {
        Self {
            service: Arc::new(Form033Service::new(
                cfg,
                patients,
                StaticRankedOptions::standard(),
            )),
        }
    }

    /// Build state from raw environment values without reading the environment.
    ///
    /// `patient_data_dir`, when set, must be an existing directory of snapshots.
    pub fn from_env_values(
        establishment: Option<String>,
        province: Option<String>,
        canton: Option<String>,
        patient_data_dir: Option<String>,
    ) -> anyhow::Result<Self> {
        let cfg = core_config_from_env_values(establishment, province, canton)?;

        let patients = match patient_data_dir.filter(|d| !d.trim().is_empty()) {
            Some(dir) => {
                let dir = Path::new(&dir);
                if !dir.is_dir() {
                    anyhow::bail!("Patient data directory does not exist: {}", dir.display());
                }
                load_patient_dir(dir)?
            }
            None => InMemoryPatientSource::new(),
        };

        Ok(Self::new(Arc::new(cfg), patients))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
    pub catalog_revision: u32,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, legend, build_form033, patient_form033),
    components(schemas(
        HealthRes,
        LegendDocument,
        reference::LegendGroupWire,
        reference::SymbolWire,
        ExportDocument,
        export::PatientSectionWire,
        export::PermanentChartWire,
        export::TemporaryChartWire,
        export::PrimaryCellWire,
        export::AttributeCellWire,
        export::IndicesWire,
        export::CpoWire,
        export::CeoWire,
        snapshot::SnapshotDocument,
        snapshot::PatientWire,
        snapshot::ToothWire,
        snapshot::SurfaceWire,
        snapshot::FindingWire,
        snapshot::DiagnosisWire,
    ))
)]
pub struct ApiDoc;

/// Router with every endpoint, Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/legend", get(legend))
        .route("/form033", post(build_form033))
        .route("/patients/:id/form033", get(patient_form033))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type ApiError = (StatusCode, String);

fn engine_error(err: Form033Error) -> ApiError {
    match err {
        Form033Error::UnknownPatient(_) => (StatusCode::NOT_FOUND, err.to_string()),
        Form033Error::EmptyToothSet(_) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        Form033Error::InvalidInput(_) | Form033Error::InvalidValue(_) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        Form033Error::PatientSource { .. } => {
            tracing::error!("Patient source error: {:?}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
        }
    }
}

fn wire_error(err: WireError) -> ApiError {
    match err {
        WireError::InvalidInput(_)
        | WireError::InvalidJson(_)
        | WireError::InvalidYaml(_)
        | WireError::Translation(_)
        | WireError::InvalidExport(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        WireError::Io(_) => {
            tracing::error!("I/O error: {:?}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Form033 REST API is alive".into(),
        catalog_revision: CATALOG_REVISION,
    })
}

#[utoipa::path(
    get,
    path = "/legend",
    responses(
        (status = 200, description = "Symbol legend grouped as printed on the form", body = LegendDocument)
    )
)]
/// Symbol legend of the catalog
#[axum::debug_handler]
async fn legend(State(_state): State<AppState>) -> Json<LegendDocument> {
    Json(form033_wire::legend_document())
}

#[utoipa::path(
    post,
    path = "/form033",
    request_body = SnapshotDocument,
    responses(
        (status = 200, description = "Form033 export", body = ExportDocument),
        (status = 400, description = "Snapshot does not match the schema"),
        (status = 422, description = "Snapshot has no teeth")
    )
)]
/// Build a Form033 export from a patient snapshot
///
/// The body is a JSON snapshot. Schema mismatches are reported with the failing field path.
///
/// # Errors
/// Returns `400 Bad Request` if the snapshot cannot be parsed and `422 Unprocessable Entity` if
/// it records no teeth.
#[axum::debug_handler]
async fn build_form033(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ExportDocument>, ApiError> {
    let record = Snapshot::parse_json(&body).map_err(wire_error)?;
    let report = state
        .service
        .generate_for_record(&record)
        .map_err(engine_error)?;
    Ok(Json(Form033Export::render(&report)))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/form033",
    params(
        ("id" = String, Path, description = "Patient UUID")
    ),
    responses(
        (status = 200, description = "Form033 export", body = ExportDocument),
        (status = 400, description = "Invalid patient id"),
        (status = 404, description = "Unknown patient"),
        (status = 422, description = "Patient has no teeth")
    )
)]
/// Build the Form033 export of a stored patient
///
/// # Errors
/// Returns `404 Not Found` for unknown patients and `422 Unprocessable Entity` when the stored
/// snapshot records no teeth.
#[axum::debug_handler]
async fn patient_form033(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<ExportDocument>, ApiError> {
    let patient_id = Uuid::parse_str(&id)
        .map_err(|_| (StatusCode::BAD_REQUEST, format!("invalid patient id: {id}")))?;
    let report = state.service.generate(patient_id).map_err(engine_error)?;
    Ok(Json(Form033Export::render(&report)))
}
