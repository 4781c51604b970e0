use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};

/// Main entry point for the Form033 application
///
/// Loads `.env`, then serves the REST API (with Swagger UI at `/swagger-ui`).
///
/// # Environment Variables
/// - `FORM033_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `FORM033_PATIENT_DATA_DIR`: Directory of patient snapshots (optional)
/// - `FORM033_ESTABLISHMENT`, `FORM033_PROVINCE`, `FORM033_CANTON`: Facility printed on the form
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("form033=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("FORM033_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("++ Starting Form033 REST on {}", rest_addr);

    let state = AppState::from_env_values(
        std::env::var("FORM033_ESTABLISHMENT").ok(),
        std::env::var("FORM033_PROVINCE").ok(),
        std::env::var("FORM033_CANTON").ok(),
        std::env::var("FORM033_PATIENT_DATA_DIR").ok(),
    )?;

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
