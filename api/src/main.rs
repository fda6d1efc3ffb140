use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use otp_api::{create_app, AppState};
use otp_core::repositories::{InMemoryOtpRepository, OtpRepository};
use otp_core::services::otp::{OtpService, OtpServiceConfig};
use otp_shared::{AppConfig, StoreBackend};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.environment.default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        environment = %config.environment,
        store = %config.store,
        "Starting email OTP API server"
    );

    let service_config = OtpServiceConfig::from_env();

    match config.store {
        StoreBackend::Redis => {
            let repository = otp_infra::initialize(config.cache.clone())
                .await
                .context("failed to connect to Redis")?;
            serve(config, Arc::new(repository), service_config).await
        }
        StoreBackend::Memory => {
            if config.environment.is_production() {
                tracing::warn!("In-memory OTP store selected in production; records are lost on restart");
            }
            serve(config, Arc::new(InMemoryOtpRepository::new()), service_config).await
        }
    }
}

async fn serve<R>(
    config: AppConfig,
    repository: Arc<R>,
    service_config: OtpServiceConfig,
) -> anyhow::Result<()>
where
    R: OtpRepository + 'static,
{
    let otp_service = OtpService::new(repository, service_config)
        .context("invalid OTP service configuration")?;
    let app_state = web::Data::new(AppState::new(Arc::new(otp_service)));

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let server_config = config.server.clone();
    let mut server = HttpServer::new(move || create_app(app_state.clone(), &server_config));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await
        .context("server terminated unexpectedly")
}
