use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::{OtpResponse, RefreshTokenRequest};
use crate::handlers::{handle_domain_error, handle_validation_errors};

use otp_core::repositories::OtpRepository;

use super::AppState;

/// Handler for POST /api/v1/otp/refresh
///
/// Exchanges a refresh token for a new one. The presented token stops working
/// once this call succeeds.
///
/// # Request Body
///
/// ```json
/// {
///     "refreshToken": "q0Qb8V2k..."
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: empty token
/// - 404 Not Found: unknown, already rotated, or expired token
/// - 503 Service Unavailable: store unreachable or token generation failed
pub async fn refresh_token<R>(
    state: web::Data<AppState<R>>,
    request: web::Json<RefreshTokenRequest>,
) -> HttpResponse
where
    R: OtpRepository + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_validation_errors(&errors);
    }

    match state.otp_service.refresh_token(&request.refresh_token).await {
        Ok(record) => HttpResponse::Ok().json(OtpResponse::from(record)),
        Err(error) => handle_domain_error(&error),
    }
}
