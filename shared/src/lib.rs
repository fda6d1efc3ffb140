//! Shared utilities and common types for the email OTP server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures
//! - Email helpers (validation, masking for logs)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{AppConfig, CacheConfig, Environment, ServerConfig, StoreBackend};
pub use errors::{error_codes, ErrorResponse};
pub use utils::email;
