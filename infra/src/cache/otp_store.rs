//! Redis-backed OTP record store
//!
//! Key layout under the configured prefix `p`:
//!
//! | key                    | type   | value                                  |
//! |------------------------|--------|----------------------------------------|
//! | `p:record:{id}`        | string | JSON record, `EX ttl`                  |
//! | `p:refresh:{token}`    | string | record id, `EX ttl`                    |
//! | `p:email:{email}`      | zset   | record ids scored by creation millis   |
//!
//! Redis expires the record and refresh keys on its own. Email index members
//! can outlive their record, so every email lookup skips and prunes members
//! whose record key is gone. All writes touching more than one key run as
//! Lua scripts. Delete and rotate are not idempotent, so they run once
//! without retry.

use async_trait::async_trait;
use redis::Script;
use tracing::{debug, info, warn};

use otp_core::domain::entities::OtpRecord;
use otp_core::errors::DomainError;
use otp_core::repositories::OtpRepository;

use crate::cache::RedisClient;
use crate::InfrastructureError;

/// Drops the previous version's stale index entries, then writes the record,
/// its refresh key, and its email index membership.
///
/// KEYS: record, refresh, email
/// ARGV: prefix, payload, ttl, score, id
const SAVE_SCRIPT: &str = r#"
local prefix = ARGV[1]
local ttl = tonumber(ARGV[3])
local id = ARGV[5]

local previous = redis.call('GET', KEYS[1])
if previous then
  local old = cjson.decode(previous)
  local old_refresh = prefix .. ':refresh:' .. old.refresh_token
  if old_refresh ~= KEYS[2] and redis.call('GET', old_refresh) == id then
    redis.call('DEL', old_refresh)
  end
  local old_email = prefix .. ':email:' .. old.email
  if old_email ~= KEYS[3] then
    redis.call('ZREM', old_email, id)
  end
end

redis.call('SET', KEYS[1], ARGV[2], 'EX', ttl)
redis.call('SET', KEYS[2], id, 'EX', ttl)
redis.call('ZADD', KEYS[3], ARGV[4], id)
if redis.call('TTL', KEYS[3]) < ttl then
  redis.call('EXPIRE', KEYS[3], ttl)
end
return 1
"#;

/// Same writes as the save script, but only while the stored record still
/// holds the expected refresh token. Returns false when it does not.
///
/// KEYS: record, refresh, email
/// ARGV: prefix, payload, ttl, score, id, expected token
const ROTATE_SCRIPT: &str = r#"
local previous = redis.call('GET', KEYS[1])
if not previous then
  return false
end
local old = cjson.decode(previous)
if old.refresh_token ~= ARGV[6] then
  return false
end

local ttl = tonumber(ARGV[3])
local id = ARGV[5]
local old_refresh = ARGV[1] .. ':refresh:' .. old.refresh_token
if old_refresh ~= KEYS[2] and redis.call('GET', old_refresh) == id then
  redis.call('DEL', old_refresh)
end

redis.call('SET', KEYS[1], ARGV[2], 'EX', ttl)
redis.call('SET', KEYS[2], id, 'EX', ttl)
redis.call('ZADD', KEYS[3], ARGV[4], id)
if redis.call('TTL', KEYS[3]) < ttl then
  redis.call('EXPIRE', KEYS[3], ttl)
end
return 1
"#;

/// Returns the payload of the first live member in score-descending order.
///
/// KEYS: email
/// ARGV: prefix
const FIND_BY_EMAIL_SCRIPT: &str = r#"
local ids = redis.call('ZREVRANGE', KEYS[1], 0, -1)
for _, id in ipairs(ids) do
  local payload = redis.call('GET', ARGV[1] .. ':record:' .. id)
  if payload then
    return payload
  end
  redis.call('ZREM', KEYS[1], id)
end
return false
"#;

/// Follows the refresh key to its record and checks the token is still current.
///
/// KEYS: refresh
/// ARGV: prefix, token
const FIND_BY_REFRESH_TOKEN_SCRIPT: &str = r#"
local id = redis.call('GET', KEYS[1])
if not id then
  return false
end
local payload = redis.call('GET', ARGV[1] .. ':record:' .. id)
if not payload then
  return false
end
if cjson.decode(payload).refresh_token ~= ARGV[2] then
  return false
end
return payload
"#;

/// Removes the record and both index entries, returning the removed payload.
///
/// KEYS: record
/// ARGV: prefix, id
const DELETE_SCRIPT: &str = r#"
local payload = redis.call('GET', KEYS[1])
if not payload then
  return false
end
local record = cjson.decode(payload)
redis.call('DEL', KEYS[1])

local refresh_key = ARGV[1] .. ':refresh:' .. record.refresh_token
if redis.call('GET', refresh_key) == ARGV[2] then
  redis.call('DEL', refresh_key)
end

local email_key = ARGV[1] .. ':email:' .. record.email
redis.call('ZREM', email_key, ARGV[2])
if redis.call('ZCARD', email_key) == 0 then
  redis.call('DEL', email_key)
end
return payload
"#;

/// Key names for one prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpKeys {
    prefix: String,
}

impl OtpKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn record(&self, id: &str) -> String {
        format!("{}:record:{}", self.prefix, id)
    }

    pub fn refresh(&self, token: &str) -> String {
        format!("{}:refresh:{}", self.prefix, token)
    }

    pub fn email(&self, email: &str) -> String {
        format!("{}:email:{}", self.prefix, email)
    }
}

/// OTP record store on Redis
///
/// Assumes a single Redis node: the scripts derive some key names at run
/// time, which Redis Cluster does not allow.
#[derive(Clone)]
pub struct RedisOtpRepository {
    client: RedisClient,
    keys: OtpKeys,
    save_script: Script,
    rotate_script: Script,
    find_by_email_script: Script,
    find_by_refresh_token_script: Script,
    delete_script: Script,
}

impl RedisOtpRepository {
    /// Create a store using the client's configured key prefix
    pub fn new(client: RedisClient) -> Self {
        let keys = OtpKeys::new(client.config().key_prefix.clone());
        Self {
            client,
            keys,
            save_script: Script::new(SAVE_SCRIPT),
            rotate_script: Script::new(ROTATE_SCRIPT),
            find_by_email_script: Script::new(FIND_BY_EMAIL_SCRIPT),
            find_by_refresh_token_script: Script::new(FIND_BY_REFRESH_TOKEN_SCRIPT),
            delete_script: Script::new(DELETE_SCRIPT),
        }
    }

    /// The underlying Redis client
    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    /// Key names used by this store
    pub fn keys(&self) -> &OtpKeys {
        &self.keys
    }

    /// KEYS and leading ARGV shared by the save and rotate scripts
    fn write_arguments(
        &self,
        record: &OtpRecord,
    ) -> Result<(Vec<String>, Vec<String>), DomainError> {
        if record.ttl == 0 {
            return Err(DomainError::Validation {
                message: "TTL must be at least one second".to_string(),
            });
        }

        let payload = serde_json::to_string(record).map_err(InfrastructureError::Serialization)?;
        let keys = vec![
            self.keys.record(&record.id),
            self.keys.refresh(&record.refresh_token),
            self.keys.email(&record.email),
        ];
        let args = vec![
            self.keys.prefix().to_string(),
            payload,
            record.ttl.to_string(),
            record.created_at_millis().to_string(),
            record.id.clone(),
        ];
        Ok((keys, args))
    }

    pub(crate) fn decode(payload: Option<String>) -> Result<Option<OtpRecord>, DomainError> {
        payload
            .map(|json| serde_json::from_str::<OtpRecord>(&json))
            .transpose()
            .map_err(|e| {
                warn!(error = %e, "Stored OTP record could not be decoded");
                DomainError::from(InfrastructureError::Serialization(e))
            })
    }
}

#[async_trait]
impl OtpRepository for RedisOtpRepository {
    async fn save(&self, record: OtpRecord) -> Result<OtpRecord, DomainError> {
        let (keys, args) = self.write_arguments(&record)?;

        self.client
            .invoke_script::<i64>(&self.save_script, &keys, &args)
            .await?;

        debug!(otp_id = %record.id, ttl = record.ttl, "Saved OTP record to Redis");

        Ok(record)
    }

    async fn rotate_refresh_token(
        &self,
        record: OtpRecord,
        previous_token: &str,
    ) -> Result<Option<OtpRecord>, DomainError> {
        let (keys, mut args) = self.write_arguments(&record)?;
        args.push(previous_token.to_string());

        let written: Option<i64> = self
            .client
            .invoke_script_once(&self.rotate_script, &keys, &args)
            .await?;

        if written.is_none() {
            debug!(otp_id = %record.id, "Rotation skipped, record gone or token already rotated");
            return Ok(None);
        }

        debug!(otp_id = %record.id, ttl = record.ttl, "Rotated OTP refresh token in Redis");

        Ok(Some(record))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<OtpRecord>, DomainError> {
        let payload = self.client.get(&self.keys.record(id)).await?;
        Self::decode(payload)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<OtpRecord>, DomainError> {
        let payload: Option<String> = self
            .client
            .invoke_script(
                &self.find_by_email_script,
                &[self.keys.email(email)],
                &[self.keys.prefix().to_string()],
            )
            .await?;
        Self::decode(payload)
    }

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<OtpRecord>, DomainError> {
        let payload: Option<String> = self
            .client
            .invoke_script(
                &self.find_by_refresh_token_script,
                &[self.keys.refresh(token)],
                &[self.keys.prefix().to_string(), token.to_string()],
            )
            .await?;
        Self::decode(payload)
    }

    async fn delete(&self, id: &str) -> Result<Option<OtpRecord>, DomainError> {
        let payload: Option<String> = self
            .client
            .invoke_script_once(
                &self.delete_script,
                &[self.keys.record(id)],
                &[self.keys.prefix().to_string(), id.to_string()],
            )
            .await?;

        let removed = Self::decode(payload)?;
        if removed.is_some() {
            info!(otp_id = %id, "Removed OTP record from Redis");
        }
        Ok(removed)
    }

    async fn is_available(&self) -> bool {
        self.client.health_check().await.unwrap_or(false)
    }
}
