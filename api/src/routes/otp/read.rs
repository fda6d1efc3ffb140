use actix_web::{web, HttpResponse};

use crate::dto::OtpResponse;
use crate::handlers::handle_domain_error;

use otp_core::repositories::OtpRepository;

use super::AppState;

/// Handler for GET /api/v1/otp/{idOrEmail}
///
/// The path segment is tried as a record id first, then as an email.
///
/// ## Errors
/// - 404 Not Found: nothing matches, or the record expired
/// - 503 Service Unavailable: store unreachable
pub async fn read_otp<R>(state: web::Data<AppState<R>>, path: web::Path<String>) -> HttpResponse
where
    R: OtpRepository + 'static,
{
    match state.otp_service.read(&path).await {
        Ok(record) => HttpResponse::Ok().json(OtpResponse::from(record)),
        Err(error) => handle_domain_error(&error),
    }
}
