//! OTP record entity: a one-time passcode bound to a rotating refresh token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A one-time passcode issued to an email address.
///
/// The record lives for `ttl` seconds after its last save; expiry is enforced
/// by the store, never by this type. Only `refresh_token` changes after
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    /// Primary identifier, assigned once at creation
    pub id: String,

    /// Recipient address, also the secondary lookup key
    pub email: String,

    /// The passcode value (opaque to this service)
    pub otp: String,

    /// Current refresh token; the only live token for this record
    pub refresh_token: String,

    /// Seconds until the record and its index entries expire
    pub ttl: u64,

    /// Creation instant, used to pick a winner when several records share an email
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Creates a new record with a fresh UUID v4 identifier
    pub fn new(
        email: impl Into<String>,
        otp: impl Into<String>,
        ttl: u64,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.into(),
            otp: otp.into(),
            refresh_token: refresh_token.into(),
            ttl,
            created_at: Utc::now(),
        }
    }

    /// Replaces the refresh token, returning the one it held before
    pub fn rotate_refresh_token(&mut self, new_token: String) -> String {
        std::mem::replace(&mut self.refresh_token, new_token)
    }

    /// Creation time in milliseconds since the epoch (email index score)
    pub fn created_at_millis(&self) -> i64 {
        self.created_at.timestamp_millis()
    }

    /// Whether `self` takes precedence over `other` for a shared email.
    ///
    /// Most recently created wins; equal timestamps fall back to the greater id.
    pub fn supersedes(&self, other: &OtpRecord) -> bool {
        (self.created_at_millis(), self.id.as_str()) > (other.created_at_millis(), other.id.as_str())
    }
}
