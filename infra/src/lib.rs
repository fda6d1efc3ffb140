//! # Infrastructure Layer
//!
//! Concrete storage for the email OTP service. The only backend is Redis:
//! records, the email index, and the refresh-token index live under one key
//! prefix, and every multi-key change runs as a single Lua script so readers
//! never observe a half-applied update.

// Re-export core types for convenience
pub use otp_core::errors::*;

/// Cache module - Redis client and the Redis-backed OTP store
pub mod cache;

/// Configuration module for infrastructure services
pub mod config {
    //! Configuration management for infrastructure services

    pub use otp_shared::config::CacheConfig;
}

/// Connect to Redis and build the OTP store
///
/// Fails fast when the URL is malformed or the server cannot be reached after
/// the configured number of attempts.
pub async fn initialize(
    config: config::CacheConfig,
) -> Result<cache::RedisOtpRepository, InfrastructureError> {
    tracing::info!("Initializing Redis OTP store...");

    let client = cache::RedisClient::new(config).await?;
    let repository = cache::RedisOtpRepository::new(client);

    tracing::info!("Redis OTP store initialized successfully");

    Ok(repository)
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Stored payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        DomainError::storage(error)
    }
}
