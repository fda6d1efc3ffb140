//! Main OTP lifecycle service implementation

use std::sync::Arc;

use otp_shared::utils::email::{is_valid_email, mask_email, mask_token};

use crate::domain::entities::OtpRecord;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::OtpRepository;
use crate::services::token::{SecureTokenGenerator, TokenGenerator};

use super::config::OtpServiceConfig;
use super::types::{CreateOtp, Resolution};

/// Service managing the OTP record lifecycle
///
/// Holds no mutable state of its own: the store is the synchronization
/// boundary, so one instance can be shared across any number of requests.
pub struct OtpService<R: OtpRepository, G: TokenGenerator = SecureTokenGenerator> {
    repository: Arc<R>,
    generator: G,
    config: OtpServiceConfig,
}

impl<R: OtpRepository> OtpService<R, SecureTokenGenerator> {
    /// Creates a new OTP service backed by the OS CSPRNG
    ///
    /// # Arguments
    ///
    /// * `repository` - OTP record store
    /// * `config` - Service configuration
    ///
    /// # Returns
    ///
    /// A new `OtpService`, or a validation error if the configured token
    /// length is zero
    pub fn new(repository: Arc<R>, config: OtpServiceConfig) -> DomainResult<Self> {
        let generator = SecureTokenGenerator::new(config.refresh_token_bytes)?;
        Ok(Self::with_generator(repository, generator, config))
    }
}

impl<R: OtpRepository, G: TokenGenerator> OtpService<R, G> {
    /// Creates a new OTP service with an explicit token generator
    pub fn with_generator(repository: Arc<R>, generator: G, config: OtpServiceConfig) -> Self {
        Self {
            repository,
            generator,
            config,
        }
    }

    /// The underlying record store
    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// The service configuration
    pub fn config(&self) -> &OtpServiceConfig {
        &self.config
    }

    /// Issues a new OTP record
    ///
    /// Mints a refresh token, assigns a fresh id and stores the record. The
    /// returned record carries the refresh token; this is the only time the
    /// caller receives it without presenting it.
    ///
    /// # Errors
    ///
    /// * `Validation` - malformed email, blank otp, or a TTL outside `1..=max_ttl_seconds`
    /// * `TokenGeneration` - the OS random source failed
    /// * `Storage` - the store rejected the save
    pub async fn create(&self, request: CreateOtp) -> DomainResult<OtpRecord> {
        let ttl = self.validate_create(&request)?;
        let refresh_token = self.generator.generate()?;

        let record = OtpRecord::new(request.email, request.otp, ttl, refresh_token);
        let saved = self.repository.save(record).await?;

        tracing::info!(
            otp_id = %saved.id,
            email = %mask_email(&saved.email),
            ttl = saved.ttl,
            event = "otp_created",
            "OTP record created"
        );

        Ok(saved)
    }

    /// Resolves an input that may be a record id or an email
    ///
    /// The id lookup always runs first; the email index is only consulted
    /// when no record has that id.
    pub async fn resolve(&self, id_or_email: &str) -> DomainResult<Resolution> {
        if let Some(record) = self.repository.find_by_id(id_or_email).await? {
            return Ok(Resolution::ById(record));
        }
        if let Some(record) = self.repository.find_by_email(id_or_email).await? {
            return Ok(Resolution::ByEmail(record));
        }
        Ok(Resolution::NotFound)
    }

    /// Reads a record by id or email
    pub async fn read(&self, id_or_email: &str) -> DomainResult<OtpRecord> {
        let resolution = self.resolve(id_or_email).await?;
        tracing::debug!(path = resolution.path(), "Resolved OTP read");

        resolution.into_record().ok_or_else(DomainError::otp_not_found)
    }

    /// Deletes the record addressed by id or email
    ///
    /// The delete targets the resolved record's id, never the raw input, so a
    /// concurrent create for the same email cannot be removed by mistake.
    ///
    /// # Returns
    ///
    /// The record as it was immediately before deletion
    pub async fn delete(&self, id_or_email: &str) -> DomainResult<OtpRecord> {
        let resolution = self.resolve(id_or_email).await?;
        let path = resolution.path();
        let record = resolution
            .into_record()
            .ok_or_else(DomainError::otp_not_found)?;

        // Expired or deleted between resolve and delete
        let snapshot = self
            .repository
            .delete(&record.id)
            .await?
            .ok_or_else(DomainError::otp_not_found)?;

        tracing::info!(
            otp_id = %snapshot.id,
            email = %mask_email(&snapshot.email),
            path,
            event = "otp_deleted",
            "OTP record deleted"
        );

        Ok(snapshot)
    }

    /// Rotates the refresh token of the record holding `old_token`
    ///
    /// The old token stops resolving as soon as the rotation completes, so a
    /// replay of it returns `NotFound`. The store only writes the new token
    /// while the record still holds `old_token`: a delete, an expiry, or a
    /// competing refresh landing after the lookup turns this call into
    /// `NotFound` instead of reviving the record.
    ///
    /// # Returns
    ///
    /// The updated record carrying the new refresh token
    pub async fn refresh_token(&self, old_token: &str) -> DomainResult<OtpRecord> {
        let Some(mut record) = self.repository.find_by_refresh_token(old_token).await? else {
            tracing::warn!(
                token = %mask_token(old_token),
                event = "refresh_token_unknown",
                "Refresh token did not resolve"
            );
            return Err(DomainError::otp_not_found());
        };

        let new_token = self.generator.generate()?;
        let id = record.id.clone();
        record.rotate_refresh_token(new_token);

        let Some(saved) = self
            .repository
            .rotate_refresh_token(record, old_token)
            .await?
        else {
            tracing::warn!(
                otp_id = %id,
                event = "refresh_token_lost_race",
                "Record was deleted, expired, or rotated during refresh"
            );
            return Err(DomainError::otp_not_found());
        };

        tracing::info!(
            otp_id = %saved.id,
            event = "refresh_token_rotated",
            "Refresh token rotated"
        );

        Ok(saved)
    }

    fn validate_create(&self, request: &CreateOtp) -> DomainResult<u64> {
        if !is_valid_email(&request.email) {
            return Err(DomainError::Validation {
                message: format!("Invalid email address: {}", mask_email(&request.email)),
            });
        }
        if request.otp.trim().is_empty() {
            return Err(DomainError::Validation {
                message: "OTP must not be blank".to_string(),
            });
        }

        let ttl = request.ttl.unwrap_or(self.config.default_ttl_seconds);
        if ttl == 0 || ttl > self.config.max_ttl_seconds {
            return Err(DomainError::Validation {
                message: format!(
                    "TTL must be between 1 and {} seconds",
                    self.config.max_ttl_seconds
                ),
            });
        }
        Ok(ttl)
    }
}
