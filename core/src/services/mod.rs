//! Business services
//!
//! - `token` - secure refresh-token generation
//! - `otp` - OTP record lifecycle (create, read, delete, refresh-token rotation)

pub mod otp;
pub mod token;

pub use otp::{CreateOtp, OtpService, OtpServiceConfig, Resolution};
pub use token::{SecureTokenGenerator, TokenGenerator};
