//! Cache module for Redis-based storage
//!
//! Provides the Redis client (connection retry, command retry with backoff)
//! and the OTP record store built on top of it.

pub mod otp_store;
pub mod redis_client;

#[cfg(test)]
mod tests;

pub use otp_store::{OtpKeys, RedisOtpRepository};
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use otp_shared::config::CacheConfig;
