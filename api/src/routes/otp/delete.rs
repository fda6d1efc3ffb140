use actix_web::{web, HttpResponse};

use crate::dto::OtpResponse;
use crate::handlers::handle_domain_error;

use otp_core::repositories::OtpRepository;

use super::AppState;

/// Handler for DELETE /api/v1/otp/{idOrEmail}
///
/// Responds 200 with the record as it was just before removal.
///
/// ## Errors
/// - 404 Not Found: nothing matches, or the record expired
/// - 503 Service Unavailable: store unreachable
pub async fn delete_otp<R>(state: web::Data<AppState<R>>, path: web::Path<String>) -> HttpResponse
where
    R: OtpRepository + 'static,
{
    match state.otp_service.delete(&path).await {
        Ok(snapshot) => HttpResponse::Ok().json(OtpResponse::from(snapshot)),
        Err(error) => handle_domain_error(&error),
    }
}
