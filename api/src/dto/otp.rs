use serde::{Deserialize, Serialize};
use validator::Validate;

use otp_core::domain::entities::OtpRecord;
use otp_core::services::otp::CreateOtp;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOtpRequest {
    /// Recipient address, also usable as a lookup key
    #[validate(email)]
    pub email: String,

    /// Passcode value, stored as-is
    #[validate(length(min = 1, max = 64))]
    pub otp: String,

    /// Lifetime in seconds; the server default applies when omitted
    #[validate(range(min = 1))]
    pub ttl: Option<u64>,
}

impl From<CreateOtpRequest> for CreateOtp {
    fn from(request: CreateOtpRequest) -> Self {
        CreateOtp {
            email: request.email,
            otp: request.otp,
            ttl: request.ttl,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// Record as returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpResponse {
    pub id: String,
    pub email: String,
    pub otp: String,
    pub ttl: u64,
    pub refresh_token: String,
}

impl From<OtpRecord> for OtpResponse {
    fn from(record: OtpRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            otp: record.otp,
            ttl: record.ttl,
            refresh_token: record.refresh_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let valid = CreateOtpRequest {
            email: "a@x.com".to_string(),
            otp: "123456".to_string(),
            ttl: Some(300),
        };
        assert!(valid.validate().is_ok());

        let no_ttl = CreateOtpRequest { ttl: None, ..valid.clone() };
        assert!(no_ttl.validate().is_ok());

        let zero_ttl = CreateOtpRequest { ttl: Some(0), ..valid.clone() };
        let errors = zero_ttl.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("ttl"));

        let bad_email = CreateOtpRequest {
            email: "not-an-email".to_string(),
            ..valid
        };
        let errors = bad_email.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_response_uses_camel_case() {
        let record = OtpRecord::new("a@x.com", "123456", 300, "token");
        let json = serde_json::to_value(OtpResponse::from(record.clone())).unwrap();

        assert_eq!(json["refreshToken"], "token");
        assert_eq!(json["id"], record.id.as_str());
        assert!(json.get("refresh_token").is_none());
        assert!(json.get("createdAt").is_none());
    }

    #[test]
    fn test_refresh_request_reads_camel_case() {
        let request: RefreshTokenRequest =
            serde_json::from_value(serde_json::json!({ "refreshToken": "abc" })).unwrap();
        assert_eq!(request.refresh_token, "abc");
    }
}
