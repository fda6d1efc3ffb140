use actix_web::{error::InternalError, error::JsonPayloadError, HttpRequest, HttpResponse};
use validator::ValidationErrors;

use otp_core::errors::DomainError;
use otp_shared::{error_codes, ErrorResponse};

/// Map a domain error to its HTTP response
///
/// Not-found is the ordinary negative outcome and is logged at debug level;
/// the unavailable cases are logged as errors.
pub fn handle_domain_error(error: &DomainError) -> HttpResponse {
    match error {
        DomainError::NotFound { .. } => {
            tracing::debug!(error = %error, "Request resolved to nothing");
            HttpResponse::NotFound().json(ErrorResponse::new(
                error_codes::NOT_FOUND,
                "OTP not found or expired",
            ))
        }
        DomainError::Validation { message } => HttpResponse::BadRequest().json(
            ErrorResponse::new(error_codes::VALIDATION_ERROR, message.as_str()),
        ),
        DomainError::Storage { .. } => {
            tracing::error!(error = %error, "OTP store unavailable");
            HttpResponse::ServiceUnavailable().json(ErrorResponse::new(
                error_codes::STORAGE_UNAVAILABLE,
                "Storage is temporarily unavailable. Please try again",
            ))
        }
        DomainError::TokenGeneration { .. } => {
            tracing::error!(error = %error, "Refresh token generation failed");
            HttpResponse::ServiceUnavailable().json(ErrorResponse::new(
                error_codes::SERVICE_UNAVAILABLE,
                "Service is temporarily unavailable",
            ))
        }
    }
}

/// 400 response listing the fields that failed validation
pub fn handle_validation_errors(errors: &ValidationErrors) -> HttpResponse {
    let mut response = ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request data");
    for (field, field_errors) in errors.field_errors() {
        let codes: Vec<String> = field_errors.iter().map(|e| e.code.to_string()).collect();
        response = response.add_detail(field.to_string(), codes);
    }
    HttpResponse::BadRequest().json(response)
}

/// Error handler for `web::JsonConfig`: malformed or missing bodies become
/// a 400 in the shared error format
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest()
        .json(ErrorResponse::new(error_codes::BAD_REQUEST, err.to_string()));
    InternalError::from_response(err, response).into()
}
