use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::{CreateOtpRequest, OtpResponse};
use crate::handlers::{handle_domain_error, handle_validation_errors};

use otp_core::repositories::OtpRepository;

use super::AppState;

/// Handler for POST /api/v1/otp
///
/// # Request Body
///
/// ```json
/// {
///     "email": "a@x.com",
///     "otp": "123456",
///     "ttl": 300
/// }
/// ```
///
/// # Response
///
/// ## Success (201 Created)
/// ```json
/// {
///     "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
///     "email": "a@x.com",
///     "otp": "123456",
///     "ttl": 300,
///     "refreshToken": "q0Qb8V2k..."
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: invalid email, empty otp, or ttl out of range
/// - 503 Service Unavailable: store unreachable or token generation failed
pub async fn create_otp<R>(
    state: web::Data<AppState<R>>,
    request: web::Json<CreateOtpRequest>,
) -> HttpResponse
where
    R: OtpRepository + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_validation_errors(&errors);
    }

    match state.otp_service.create(request.into_inner().into()).await {
        Ok(record) => HttpResponse::Created().json(OtpResponse::from(record)),
        Err(error) => handle_domain_error(&error),
    }
}
