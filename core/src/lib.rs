//! # Email OTP Core
//!
//! Core business logic for the email OTP service.
//! This crate contains the OTP record entity, the record store contract with an
//! in-memory implementation, secure refresh-token generation, and the lifecycle
//! service that ties them together.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::OtpRecord;
pub use errors::{DomainError, DomainResult};
pub use repositories::{InMemoryOtpRepository, OtpRepository};
pub use services::otp::{CreateOtp, OtpService, OtpServiceConfig, Resolution};
pub use services::token::{SecureTokenGenerator, TokenGenerator};
