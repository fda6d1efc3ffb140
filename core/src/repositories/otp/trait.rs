//! OTP record store trait defining the interface over a TTL key-value backend.

use async_trait::async_trait;

use crate::domain::entities::OtpRecord;
use crate::errors::DomainError;

/// Repository trait for OtpRecord persistence operations
///
/// One record type, three access paths (id, email, refresh token), expiry
/// enforced by the backend. Implementations must keep the two secondary
/// indexes consistent with the primary entry for every reader:
///
/// - an index entry never resolves unless the primary record is readable,
/// - after a `save` that changed the refresh token, the old token never
///   resolves again,
/// - `delete` and TTL expiry remove the primary entry and both index entries
///   together.
///
/// A lookup that matches nothing returns `Ok(None)`; `Err` is reserved for
/// backend failures.
#[async_trait]
pub trait OtpRepository: Send + Sync {
    /// Insert or overwrite a record under its id
    ///
    /// Restarts the TTL countdown from `record.ttl` and re-points the email and
    /// refresh-token indexes at this record, dropping whatever stale entries the
    /// previously stored version owned.
    ///
    /// # Returns
    /// * `Ok(OtpRecord)` - The record as stored
    /// * `Err(DomainError::Storage)` - The backend failed
    async fn save(&self, record: OtpRecord) -> Result<OtpRecord, DomainError>;

    /// Replace a record only while it still holds `previous_token`
    ///
    /// Behaves like `save`, except the write happens only if a live record
    /// with `record.id` exists and its current refresh token equals
    /// `previous_token`. The check and the write are one atomic step, so a
    /// record that was deleted, expired, or already rotated is never written
    /// back.
    ///
    /// # Returns
    /// * `Ok(Some(OtpRecord))` - The record as stored
    /// * `Ok(None)` - No live record holds `previous_token`
    /// * `Err(DomainError::Storage)` - The backend failed
    async fn rotate_refresh_token(
        &self,
        record: OtpRecord,
        previous_token: &str,
    ) -> Result<Option<OtpRecord>, DomainError>;

    /// Find a record by its primary id
    async fn find_by_id(&self, id: &str) -> Result<Option<OtpRecord>, DomainError>;

    /// Find a record by email
    ///
    /// When several live records share the address, the most recently created
    /// one wins (ties go to the greatest id).
    async fn find_by_email(&self, email: &str) -> Result<Option<OtpRecord>, DomainError>;

    /// Find the record whose current refresh token equals `token`
    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<OtpRecord>, DomainError>;

    /// Delete a record and all its index entries
    ///
    /// # Returns
    /// * `Ok(Some(OtpRecord))` - The record as it was immediately before removal
    /// * `Ok(None)` - Nothing was stored under `id`
    /// * `Err(DomainError::Storage)` - The backend failed
    async fn delete(&self, id: &str) -> Result<Option<OtpRecord>, DomainError>;

    /// Check whether the backend is reachable
    async fn is_available(&self) -> bool {
        true
    }
}
