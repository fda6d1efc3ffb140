//! OTP lifecycle service module
//!
//! This module orchestrates the life of an OTP record:
//! - Creation with a freshly minted refresh token
//! - Lookup by id, falling back to email
//! - Deletion of the resolved record
//! - Refresh-token rotation with replay protection

mod config;
mod service;
mod types;


pub use config::OtpServiceConfig;
pub use service::OtpService;
pub use types::{CreateOtp, Resolution};
