//! Host-side lease tracking for issued credentials.
//!
//! Records live under `sys/leases/<lease_id>` next to roles and config, so
//! they survive restarts with the postgres backend.


use std::sync::Arc;
use std::time::Duration;

use broker_application::{CredentialBroker, LeaseTerms, SecretStorage};
use broker_core::{AppError, AppResult};
use broker_domain::{LeaseBounds, LeaseMetadata};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

const LEASE_KEY_PREFIX: &str = "sys/leases/";

/// Host defaults applied when a role leaves its lease bounds at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeasePolicy {
    pub default_ttl: Duration,
    pub max_ttl: Duration,
}

impl LeasePolicy {
    /// Resolves requested bounds into an effective `(ttl, max_ttl)` pair.
    fn resolve(&self, bounds: LeaseBounds) -> (Duration, Duration) {
        let max_ttl = if bounds.max_ttl.is_zero() {
            self.max_ttl
        } else {
            bounds.max_ttl.min(self.max_ttl)
        };
        let ttl = if bounds.ttl.is_zero() {
            self.default_ttl
        } else {
            bounds.ttl
        };

        (ttl.min(max_ttl), max_ttl)
    }
}

/// Persisted lease record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseRecord {
    pub lease_id: String,
    pub role_name: String,
    pub metadata: Value,
    pub ttl_seconds: u64,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub max_expires_at: DateTime<Utc>,
}

/// Result of one expiry sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub revoked: usize,
    pub failed: usize,
}

/// Tracks leases and drives the broker's renew and revoke callbacks.
#[derive(Clone)]
pub struct LeaseLedger {
    storage: Arc<dyn SecretStorage>,
    broker: CredentialBroker,
    policy: LeasePolicy,
}

impl LeaseLedger {
    #[must_use]
    pub fn new(
        storage: Arc<dyn SecretStorage>,
        broker: CredentialBroker,
        policy: LeasePolicy,
    ) -> Self {
        Self {
            storage,
            broker,
            policy,
        }
    }

    /// Starts tracking a lease for a freshly issued credential.
    pub async fn open(&self, terms: &LeaseTerms, now: DateTime<Utc>) -> AppResult<LeaseRecord> {
        let (ttl, max_ttl) = self.policy.resolve(terms.bounds);
        let record = LeaseRecord {
            lease_id: Uuid::new_v4().to_string(),
            role_name: terms.metadata.role_name.clone(),
            metadata: terms.metadata.to_internal_data()?,
            ttl_seconds: ttl.as_secs(),
            issued_at: now,
            expires_at: after(now, ttl)?,
            max_expires_at: after(now, max_ttl)?,
        };

        self.save(&record).await?;
        info!(
            lease_id = %record.lease_id,
            role = %record.role_name,
            ttl_seconds = record.ttl_seconds,
            "opened lease"
        );

        Ok(record)
    }

    /// Extends a lease using the role's current bounds.
    ///
    /// The lease never outlives its max expiry.
    pub async fn renew(&self, lease_id: &str, now: DateTime<Utc>) -> AppResult<LeaseRecord> {
        let mut record = self.load(lease_id).await?;
        if record.expires_at <= now {
            return Err(AppError::Validation(format!(
                "lease '{lease_id}' has expired"
            )));
        }

        let metadata = LeaseMetadata::from_internal_data(&record.metadata)?;
        let (increment, max_expires_at) = match self.broker.renew(&metadata).await? {
            Some(bounds) => {
                let (ttl, max_ttl) = self.policy.resolve(bounds);
                (ttl, after(record.issued_at, max_ttl)?)
            }
            None => (
                Duration::from_secs(record.ttl_seconds),
                record.max_expires_at,
            ),
        };

        let expires_at = after(now, increment)?.min(max_expires_at);
        if expires_at <= now {
            return Err(AppError::Validation(format!(
                "lease '{lease_id}' has reached its max ttl"
            )));
        }

        record.ttl_seconds = increment.as_secs();
        record.expires_at = expires_at;
        record.max_expires_at = max_expires_at;
        self.save(&record).await?;

        info!(
            lease_id = %record.lease_id,
            role = %record.role_name,
            expires_at = %record.expires_at,
            "renewed lease"
        );

        Ok(record)
    }

    /// Revokes a lease. The record is only removed once the broker succeeds.
    pub async fn revoke(&self, lease_id: &str) -> AppResult<()> {
        let record = self.load(lease_id).await?;
        let metadata = LeaseMetadata::from_internal_data(&record.metadata)?;

        self.broker.revoke(&metadata).await?;
        self.storage.delete(lease_key(lease_id)?.as_str()).await?;

        info!(lease_id = %lease_id, role = %record.role_name, "revoked lease");
        Ok(())
    }

    /// Revokes every lease that expired at or before `now`.
    pub async fn sweep(&self, now: DateTime<Utc>) -> AppResult<SweepOutcome> {
        let mut outcome = SweepOutcome::default();

        for lease_id in self.storage.list(LEASE_KEY_PREFIX).await? {
            let record = match self.load(lease_id.as_str()).await {
                Ok(record) => record,
                Err(error) => {
                    warn!(lease_id = %lease_id, error = %error, "skipping unreadable lease");
                    outcome.failed += 1;
                    continue;
                }
            };

            if record.expires_at > now {
                continue;
            }

            match self.revoke(lease_id.as_str()).await {
                Ok(()) => outcome.revoked += 1,
                Err(error) => {
                    warn!(
                        lease_id = %lease_id,
                        role = %record.role_name,
                        error = %error,
                        "failed to revoke expired lease, will retry"
                    );
                    outcome.failed += 1;
                }
            }
        }

        Ok(outcome)
    }

    async fn load(&self, lease_id: &str) -> AppResult<LeaseRecord> {
        let Some(bytes) = self.storage.get(lease_key(lease_id)?.as_str()).await? else {
            return Err(AppError::NotFound(format!("lease '{lease_id}' not found")));
        };

        serde_json::from_slice(bytes.as_slice())
            .map_err(|error| AppError::Internal(format!("failed to decode lease: {error}")))
    }

    async fn save(&self, record: &LeaseRecord) -> AppResult<()> {
        let bytes = serde_json::to_vec(record)
            .map_err(|error| AppError::Internal(format!("failed to encode lease: {error}")))?;
        self.storage
            .put(lease_key(record.lease_id.as_str())?.as_str(), bytes)
            .await
    }
}

fn lease_key(lease_id: &str) -> AppResult<String> {
    let lease_id = Uuid::parse_str(lease_id)
        .map_err(|_| AppError::NotFound(format!("lease '{lease_id}' not found")))?;
    Ok(format!("{LEASE_KEY_PREFIX}{lease_id}"))
}

fn after(at: DateTime<Utc>, duration: Duration) -> AppResult<DateTime<Utc>> {
    TimeDelta::from_std(duration)
        .ok()
        .and_then(|delta| at.checked_add_signed(delta))
        .ok_or_else(|| AppError::Internal(format!("lease duration {duration:?} is out of range")))
}
