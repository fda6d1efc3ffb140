pub mod otp;

pub use otp::{CreateOtpRequest, OtpResponse, RefreshTokenRequest};
pub use otp_shared::ErrorResponse;
