use anyhow::Result;
use guardian_portal::{config::Config, web, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting guardian portal");

    // Load configuration from environment
    let config = Config::load()?;
    tracing::info!(
        environment = ?config.environment,
        app_id = %config.app_id,
        gateway_origin = %config.gateway_origin,
        setup_wizard_completed = config.setup_wizard_completed,
        server_side_token = config.has_server_side_access_token(),
        "Configuration loaded"
    );

    let bind_address = config.bind_address();

    // Gateway client and session token verifier; JWKS is fetched lazily
    let state = Arc::new(AppState::from_config(config)?);

    let app = web::create_router(state);

    // Bind and serve
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Guardian portal listening on {}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
