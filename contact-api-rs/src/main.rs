// contact-api-rs/src/main.rs
// Contact API - CRM contact registration over HTTP/JSON
// Port 3000 by default
//
// Implements:
// - Contact sanitization and CPF/CNPJ, phone and email validation
// - Per-client token-bucket rate limiting with idle-client eviction
// - In-memory contact storage

use config_rs::{
    get_bind_address, load_env, LoggingSettings, RateLimitSettings, CONTACT_API_DEFAULT_PORT,
    CONTACT_API_SERVICE,
};
use contact_api::rate_limit::{RateLimitConfig, RateLimitStore, RateLimiter};
use contact_api::repository::InMemoryContactRepository;
use contact_api::{telemetry, ContactApi, SERVICE_NAME};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file before reading any settings
    let env_file = load_env();

    telemetry::init_logging(&LoggingSettings::from_env(SERVICE_NAME))?;
    match env_file {
        Some(path) => tracing::info!("Loaded environment from {}", path.display()),
        None => tracing::debug!("No .env file found, using process environment"),
    }

    let rate_limit = RateLimitSettings::from_env(CONTACT_API_SERVICE);
    let store = Arc::new(RateLimitStore::new());
    let limiter = Arc::new(RateLimiter::new(
        RateLimitConfig::from_settings(&rate_limit),
        Arc::clone(&store),
    ));

    let repository = Arc::new(InMemoryContactRepository::new());
    let api = Arc::new(ContactApi::new(repository, limiter));
    let app = api.create_router();

    let addr = get_bind_address(CONTACT_API_SERVICE, CONTACT_API_DEFAULT_PORT);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Contact API listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Contact API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler the server runs until killed
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
