//! Configuration for the OTP lifecycle service

use crate::services::token::DEFAULT_TOKEN_BYTES;

/// Configuration for the OTP lifecycle service
#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Random bytes behind each refresh token
    pub refresh_token_bytes: usize,
    /// TTL applied when a create request carries none, in seconds
    pub default_ttl_seconds: u64,
    /// Upper bound accepted for a record TTL, in seconds
    pub max_ttl_seconds: u64,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            refresh_token_bytes: DEFAULT_TOKEN_BYTES,
            default_ttl_seconds: 300, // 5 minutes
            max_ttl_seconds: 86_400,  // 1 day
        }
    }
}

impl OtpServiceConfig {
    /// Load from `OTP_REFRESH_TOKEN_BYTES`, `OTP_DEFAULT_TTL_SECONDS`, `OTP_MAX_TTL_SECONDS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            refresh_token_bytes: env_or("OTP_REFRESH_TOKEN_BYTES", defaults.refresh_token_bytes),
            default_ttl_seconds: env_or("OTP_DEFAULT_TTL_SECONDS", defaults.default_ttl_seconds),
            max_ttl_seconds: env_or("OTP_MAX_TTL_SECONDS", defaults.max_ttl_seconds),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
