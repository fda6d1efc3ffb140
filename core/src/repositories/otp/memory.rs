//! In-memory implementation of OtpRepository with simulated TTL
//!
//! Used as the test double for the lifecycle service and as the development
//! backend. Every operation runs under a single lock, so the primary map and
//! both indexes always change together. Time is the wall clock since creation
//! plus a manual offset that tests move forward with [`InMemoryOtpRepository::advance`].

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::OtpRecord;
use crate::errors::DomainError;

use super::r#trait::OtpRepository;

struct StoredEntry {
    record: OtpRecord,
    expires_at: Duration,
}

#[derive(Default)]
struct StoreState {
    records: HashMap<String, StoredEntry>,
    by_email: HashMap<String, BTreeSet<String>>,
    by_refresh_token: HashMap<String, String>,
    clock_offset: Duration,
}

impl StoreState {
    fn is_live(&self, id: &str, now: Duration) -> bool {
        self.records
            .get(id)
            .map(|entry| entry.expires_at > now)
            .unwrap_or(false)
    }

    fn live_record(&self, id: &str, now: Duration) -> Option<&OtpRecord> {
        self.records
            .get(id)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| &entry.record)
    }

    /// Remove a record together with its index entries
    fn remove(&mut self, id: &str) -> Option<OtpRecord> {
        let entry = self.records.remove(id)?;
        let record = entry.record;

        if self.by_refresh_token.get(&record.refresh_token).map(String::as_str) == Some(id) {
            self.by_refresh_token.remove(&record.refresh_token);
        }
        if let Some(ids) = self.by_email.get_mut(&record.email) {
            ids.remove(id);
            if ids.is_empty() {
                self.by_email.remove(&record.email);
            }
        }

        Some(record)
    }

    /// Store `record`, dropping the index entries the previous version owned
    fn replace(&mut self, record: OtpRecord, now: Duration) {
        self.remove(&record.id);

        let id = record.id.clone();
        self.by_refresh_token
            .insert(record.refresh_token.clone(), id.clone());
        self.by_email
            .entry(record.email.clone())
            .or_default()
            .insert(id.clone());
        let expires_at = now + Duration::from_secs(record.ttl);
        self.records.insert(id, StoredEntry { record, expires_at });
    }

    fn purge_expired(&mut self, now: Duration) -> usize {
        let expired: Vec<String> = self
            .records
            .iter()
            .filter(|(_, entry)| entry.expires_at <= now)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            self.remove(id);
        }
        expired.len()
    }
}

/// In-memory OTP record store
///
/// Clones share the same underlying state.
#[derive(Clone)]
pub struct InMemoryOtpRepository {
    state: Arc<RwLock<StoreState>>,
    started: Instant,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryOtpRepository {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            started: Instant::now(),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Move the store's clock forward, expiring records whose TTL ran out
    pub async fn advance(&self, by: Duration) {
        let mut state = self.state.write().await;
        state.clock_offset += by;
        let now = self.started.elapsed() + state.clock_offset;
        let purged = state.purge_expired(now);
        debug!(advanced_secs = by.as_secs(), purged, "Advanced in-memory OTP store clock");
    }

    /// Make every subsequent call fail with a storage error (or recover)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of live records
    pub async fn len(&self) -> usize {
        let state = self.state.read().await;
        let now = self.now(&state);
        state.records.values().filter(|e| e.expires_at > now).count()
    }

    /// Whether no live record is stored
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of refresh-token index entries, live or not yet purged
    pub async fn refresh_index_len(&self) -> usize {
        self.state.read().await.by_refresh_token.len()
    }

    fn now(&self, state: &StoreState) -> Duration {
        self.started.elapsed() + state.clock_offset
    }

    fn ensure_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::storage("in-memory store marked unavailable"));
        }
        Ok(())
    }
}

impl Default for InMemoryOtpRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OtpRepository for InMemoryOtpRepository {
    async fn save(&self, record: OtpRecord) -> Result<OtpRecord, DomainError> {
        self.ensure_available()?;
        if record.ttl == 0 {
            return Err(DomainError::Validation {
                message: "TTL must be at least one second".to_string(),
            });
        }

        let mut state = self.state.write().await;
        let now = self.now(&state);
        state.purge_expired(now);

        state.replace(record.clone(), now);

        Ok(record)
    }

    async fn rotate_refresh_token(
        &self,
        record: OtpRecord,
        previous_token: &str,
    ) -> Result<Option<OtpRecord>, DomainError> {
        self.ensure_available()?;
        if record.ttl == 0 {
            return Err(DomainError::Validation {
                message: "TTL must be at least one second".to_string(),
            });
        }

        let mut state = self.state.write().await;
        let now = self.now(&state);
        state.purge_expired(now);

        let holds_token = state
            .live_record(&record.id, now)
            .map(|current| current.refresh_token == previous_token)
            .unwrap_or(false);
        if !holds_token {
            debug!(otp_id = %record.id, "Rotation skipped, record gone or token already rotated");
            return Ok(None);
        }

        state.replace(record.clone(), now);

        Ok(Some(record))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<OtpRecord>, DomainError> {
        self.ensure_available()?;

        let state = self.state.read().await;
        let now = self.now(&state);
        Ok(state.live_record(id, now).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<OtpRecord>, DomainError> {
        self.ensure_available()?;

        let state = self.state.read().await;
        let now = self.now(&state);
        let Some(ids) = state.by_email.get(email) else {
            return Ok(None);
        };

        let winner = ids
            .iter()
            .filter_map(|id| state.live_record(id, now))
            .fold(None::<&OtpRecord>, |best, candidate| match best {
                Some(current) if !candidate.supersedes(current) => Some(current),
                _ => Some(candidate),
            });

        Ok(winner.cloned())
    }

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<OtpRecord>, DomainError> {
        self.ensure_available()?;

        let state = self.state.read().await;
        let now = self.now(&state);
        let record = state
            .by_refresh_token
            .get(token)
            .and_then(|id| state.live_record(id, now))
            .filter(|record| record.refresh_token == token);

        Ok(record.cloned())
    }

    async fn delete(&self, id: &str) -> Result<Option<OtpRecord>, DomainError> {
        self.ensure_available()?;

        let mut state = self.state.write().await;
        let now = self.now(&state);
        if !state.is_live(id, now) {
            state.purge_expired(now);
            return Ok(None);
        }
        Ok(state.remove(id))
    }

    async fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }
}
