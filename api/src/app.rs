//! Application factory
//!
//! Builds the Actix-web application around an already constructed
//! `OtpService`, so the binary and the HTTP tests share the same routing.

use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use crate::handlers::json_error_handler;
use crate::routes::otp::{
    create::create_otp, delete::delete_otp, read::read_otp, refresh::refresh_token, AppState,
};

use otp_core::repositories::OtpRepository;
use otp_shared::{error_codes, ErrorResponse, ServerConfig};

/// Create and configure the application with all dependencies
pub fn create_app<R>(
    app_state: web::Data<AppState<R>>,
    server: &ServerConfig,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<
            impl actix_web::body::MessageBody,
        >,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    R: OtpRepository + 'static,
{
    App::new()
        .app_data(app_state)
        .app_data(
            web::JsonConfig::default()
                .limit(server.max_payload_size)
                .error_handler(json_error_handler),
        )
        .wrap(TracingLogger::default())
        // Health check endpoint
        .route("/health", web::get().to(health_check::<R>))
        // API v1 routes
        .service(
            web::scope("/api/v1").service(
                web::scope("/otp")
                    .route("", web::post().to(create_otp::<R>))
                    .route("/refresh", web::post().to(refresh_token::<R>))
                    .route("/{id_or_email}", web::get().to(read_otp::<R>))
                    .route("/{id_or_email}", web::delete().to(delete_otp::<R>)),
            ),
        )
        // Default 404 handler
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
///
/// Always 200; `store` reports whether the backend answered.
async fn health_check<R>(state: web::Data<AppState<R>>) -> HttpResponse
where
    R: OtpRepository + 'static,
{
    let store_up = state.otp_service.repository().is_available().await;

    HttpResponse::Ok().json(serde_json::json!({
        "status": if store_up { "healthy" } else { "degraded" },
        "store": if store_up { "up" } else { "down" },
        "service": "email-otp-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
