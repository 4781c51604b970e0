//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the Form033 REST API on its own.
//!
//! ## Intended use
//! Useful for development and debugging. The workspace's main `form033-run` binary additionally
//! loads a `.env` file before starting the same server.

use api_rest::{router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the Form033 REST API server
///
/// # Environment Variables
/// - `FORM033_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `FORM033_PATIENT_DATA_DIR`: Directory of patient snapshots served under `/patients` (optional)
/// - `FORM033_ESTABLISHMENT`, `FORM033_PROVINCE`, `FORM033_CANTON`: Facility printed on the form
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration or the patient directory is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("FORM033_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting Form033 REST API on {}", addr);

    let state = AppState::from_env_values(
        std::env::var("FORM033_ESTABLISHMENT").ok(),
        std::env::var("FORM033_PROVINCE").ok(),
        std::env::var("FORM033_CANTON").ok(),
        std::env::var("FORM033_PATIENT_DATA_DIR").ok(),
    )?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
