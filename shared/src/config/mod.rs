//! Configuration module
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Redis connection and key layout
//! - `environment` - Environment detection
//! - `server` - HTTP server binding
//! - `store` - Which OTP store backend the server runs against

pub mod cache;
pub mod environment;
pub mod server;
pub mod store;

use serde::{Deserialize, Serialize};

pub use cache::CacheConfig;
pub use environment::Environment;
pub use server::ServerConfig;
pub use store::StoreBackend;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Redis configuration
    pub cache: CacheConfig,

    /// OTP store backend
    #[serde(default)]
    pub store: StoreBackend,
}

impl AppConfig {
    /// Load configuration from environment
    pub fn from_env() -> Self {
        Self {
            environment: Environment::from_env(),
            server: ServerConfig::from_env(),
            cache: CacheConfig::from_env(),
            store: StoreBackend::from_env(),
        }
    }
}
