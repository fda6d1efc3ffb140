//! Redis client implementation
//!
//! A multiplexed async connection with connect retry, a response timeout on
//! every command, per-command retry with exponential backoff, and the handful of operations the OTP store needs:
//! plain string get/set/delete, TTL inspection, and Lua script invocation.

use redis::{
    aio::MultiplexedConnection, AsyncCommands, Client, FromRedisValue, RedisError, RedisResult,
    Script,
};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::config::CacheConfig;
use crate::InfrastructureError;

/// Upper bound for the backoff between two attempts
const MAX_RETRY_DELAY_MS: u64 = 5000;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Redis client with connection retry and command retry
///
/// Cloning is cheap: clones share the same multiplexed connection.
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
}

impl RedisClient {
    /// Create a new Redis client
    ///
    /// Retries the initial connection `config.max_retries` times, doubling
    /// `config.retry_delay_ms` between attempts.
    ///
    /// # Example
    /// ```no_run
    /// use otp_infra::cache::{CacheConfig, RedisClient};
    ///
    /// async fn create_client() -> Result<RedisClient, Box<dyn std::error::Error>> {
    ///     let config = CacheConfig::new("redis://localhost:6379").with_prefix("otp");
    ///     let client = RedisClient::new(config).await?;
    ///     Ok(client)
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(
            "Creating Redis client with URL: {} (database {})",
            mask_url(&config.url),
            config.database
        );

        let client = Client::open(connection_url(&config).as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = Self::create_connection_with_retry(&client, &config).await?;

        info!("Redis client created successfully");

        Ok(Self { connection, config })
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: &Client,
        config: &CacheConfig,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let max_retries = config.max_retries.max(1);
        let connect_timeout = Duration::from_secs(config.connection_timeout.max(1));
        let mut attempts = 0;
        let mut delay = config.retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let outcome = match timeout(connect_timeout, client.get_multiplexed_async_connection()).await {
                Ok(result) => result,
                Err(_) => Err(RedisError::from((
                    redis::ErrorKind::IoError,
                    "connection timed out",
                ))),
            };

            match outcome {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = next_delay(delay);
                }
                Err(e) => {
                    error!(
                        "Failed to connect to Redis after {} attempts: {}",
                        attempts, e
                    );
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// The configuration this client was built from
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Set a value with expiration time
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        debug!("Setting key '{}' with expiry {}s", key, expiry_seconds);

        self.execute_with_retry(|mut conn| {
            let key = key.to_string();
            let value = value.to_string();

            Box::pin(async move { conn.set_ex::<_, _, ()>(key, value, expiry_seconds).await })
        })
        .await
        .map_err(|e| {
            error!("Failed to set key '{}': {}", key, e);
            InfrastructureError::Cache(e)
        })
    }

    /// Get a value
    ///
    /// # Returns
    /// * `Ok(None)` - The key does not exist or has expired
    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        debug!("Getting key '{}'", key);

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();

                Box::pin(async move { conn.get::<_, Option<String>>(key).await })
            })
            .await;

        match result {
            Ok(value) => {
                if value.is_none() {
                    debug!("Key '{}' not found", key);
                }
                Ok(value)
            }
            Err(e) => {
                error!("Failed to get key '{}': {}", key, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Delete a key
    ///
    /// # Returns
    /// * `Ok(true)` - The key existed and was removed
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        debug!("Deleting key '{}'", key);

        self.execute_with_retry(|mut conn| {
            let key = key.to_string();

            Box::pin(async move { conn.del::<_, u32>(key).await })
        })
        .await
        .map(|deleted| deleted > 0)
        .map_err(|e| {
            error!("Failed to delete key '{}': {}", key, e);
            InfrastructureError::Cache(e)
        })
    }

    /// Get time-to-live for a key
    ///
    /// # Returns
    /// * `Ok(None)` - The key does not exist or has no expiry
    pub async fn ttl(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();

                Box::pin(async move { conn.ttl::<_, i64>(key).await })
            })
            .await;

        match result {
            Ok(ttl) if ttl >= 0 => Ok(Some(ttl)),
            Ok(_) => Ok(None),
            Err(e) => {
                error!("Failed to get TTL for key '{}': {}", key, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Run a Lua script atomically
    ///
    /// Uses EVALSHA and falls back to EVAL when the server has not cached the
    /// script yet. Transient failures are retried, so only pass scripts whose
    /// second run gives the same answer as the first.
    pub async fn invoke_script<T>(
        &self,
        script: &Script,
        keys: &[String],
        args: &[String],
    ) -> Result<T, InfrastructureError>
    where
        T: FromRedisValue + Send + 'static,
    {
        self.run_script(script, keys, args, self.config.max_retries.max(1))
            .await
    }

    /// Run a Lua script atomically, without retrying
    ///
    /// For scripts that are not idempotent: if the reply of a run that did
    /// happen gets lost, a retry would observe its effects and answer
    /// differently (a delete would find nothing). The caller gets the error
    /// instead.
    pub async fn invoke_script_once<T>(
        &self,
        script: &Script,
        keys: &[String],
        args: &[String],
    ) -> Result<T, InfrastructureError>
    where
        T: FromRedisValue + Send + 'static,
    {
        self.run_script(script, keys, args, 1).await
    }

    async fn run_script<T>(
        &self,
        script: &Script,
        keys: &[String],
        args: &[String],
        max_attempts: u32,
    ) -> Result<T, InfrastructureError>
    where
        T: FromRedisValue + Send + 'static,
    {
        debug!("Invoking script {} with {} keys", script.get_hash(), keys.len());

        self.execute_with_attempts(max_attempts, |mut conn| {
            let script = script.clone();
            let keys = keys.to_vec();
            let args = args.to_vec();

            Box::pin(async move {
                let mut invocation = script.prepare_invoke();
                for key in &keys {
                    invocation.key(key);
                }
                for arg in &args {
                    invocation.arg(arg);
                }
                invocation.invoke_async::<_, T>(&mut conn).await
            })
        })
        .await
        .map_err(|e| {
            error!("Script {} failed: {}", script.get_hash(), e);
            InfrastructureError::Cache(e)
        })
    }

    /// Execute a Redis operation with automatic retry logic
    ///
    /// Only transient errors (see [`is_retriable_error`]) are retried.
    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        self.execute_with_attempts(self.config.max_retries.max(1), operation)
            .await
    }

    async fn execute_with_attempts<F, T>(&self, max_attempts: u32, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        run_with_retry(
            max_attempts,
            self.config.retry_delay_ms,
            Duration::from_secs(self.config.response_timeout.max(1)),
            || operation(self.connection.clone()),
        )
        .await
    }

    /// Check if the Redis connection is healthy
    ///
    /// Performs a PING command to verify connectivity.
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");

        let result = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await;

        match result {
            Ok(response) if response == "PONG" => Ok(true),
            Ok(response) => {
                warn!("Redis health check returned unexpected response: {}", response);
                Ok(false)
            }
            Err(e) => {
                error!("Redis health check failed: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }
}

/// Run `operation` up to `max_attempts` times
///
/// Every attempt is bounded by `response_timeout`. Only transient errors (see
/// [`is_retriable_error`]) trigger another attempt, after a backoff starting
/// at `base_delay_ms`.
pub(crate) async fn run_with_retry<T, F, Fut>(
    max_attempts: u32,
    base_delay_ms: u64,
    response_timeout: Duration,
    mut operation: F,
) -> RedisResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RedisResult<T>>,
{
    let mut attempts = 0;
    let mut delay = base_delay_ms;

    loop {
        attempts += 1;

        match with_response_timeout(response_timeout, operation()).await {
            Ok(result) => return Ok(result),
            Err(e) if attempts < max_attempts && is_retriable_error(&e) => {
                warn!(
                    "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                    attempts, max_attempts, e, delay
                );
                sleep(Duration::from_millis(delay)).await;
                delay = next_delay(delay);
            }
            Err(e) => return Err(e),
        }
    }
}

/// Fail an operation that got no reply within `limit` with a retriable I/O error
pub(crate) async fn with_response_timeout<T, F>(limit: Duration, operation: F) -> RedisResult<T>
where
    F: Future<Output = RedisResult<T>>,
{
    match timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(RedisError::from((
            redis::ErrorKind::IoError,
            "response timed out",
        ))),
    }
}

/// Exponential backoff step, capped at [`MAX_RETRY_DELAY_MS`]
pub(crate) fn next_delay(delay: u64) -> u64 {
    delay.saturating_mul(2).min(MAX_RETRY_DELAY_MS)
}

/// Check if a Redis error is transient and the operation should be retried
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Append the configured database to the URL unless it already names one
pub(crate) fn connection_url(config: &CacheConfig) -> String {
    let url = config.url.trim_end_matches('/');
    let after_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);

    if config.database == 0 || after_scheme.contains('/') {
        url.to_string()
    } else {
        format!("{}/{}", url, config.database)
    }
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}
