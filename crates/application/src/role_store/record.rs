use std::time::Duration;

use broker_core::{AppError, AppResult};
use broker_domain::{CredentialStrategy, RoleDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current on-disk role schema version.
pub(super) const ROLE_SCHEMA_VERSION: u32 = 1;

/// Version 1 of the persisted role document.
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct StoredRole {
    schema_version: u32,
    credential_strategy: CredentialStrategy,
    #[serde(default)]
    pool_domain_or_url: String,
    #[serde(default)]
    application_client_id: String,
    #[serde(default)]
    application_client_secret: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    user_pool_id: String,
    #[serde(default)]
    group_name: String,
    #[serde(default)]
    dummy_email_domain: String,
    #[serde(default)]
    ttl_seconds: u64,
    #[serde(default)]
    max_ttl_seconds: u64,
}

impl StoredRole {
    pub(super) fn encode(role: &RoleDefinition) -> AppResult<Vec<u8>> {
        let record = Self {
            schema_version: ROLE_SCHEMA_VERSION,
            credential_strategy: role.credential_strategy(),
            pool_domain_or_url: role.pool_domain_or_url().to_owned(),
            application_client_id: role.application_client_id().unwrap_or_default().to_owned(),
            application_client_secret: role.application_client_secret().to_owned(),
            region: role.region().to_owned(),
            user_pool_id: role.user_pool_id().to_owned(),
            group_name: role.group_name().to_owned(),
            dummy_email_domain: role.dummy_email_domain().to_owned(),
            ttl_seconds: role.ttl().as_secs(),
            max_ttl_seconds: role.max_ttl().as_secs(),
        };

        serde_json::to_vec(&record)
            .map_err(|error| AppError::Internal(format!("failed to encode role: {error}")))
    }

    pub(super) fn decode(bytes: &[u8]) -> AppResult<RoleDefinition> {
        let document: Value = serde_json::from_slice(bytes)
            .map_err(|error| AppError::Internal(format!("failed to decode role: {error}")))?;

        let version = document.get("schema_version").and_then(Value::as_u64);
        if version != Some(u64::from(ROLE_SCHEMA_VERSION)) {
            return Err(AppError::Internal(format!(
                "unsupported role schema version {}",
                version.map_or_else(|| "<missing>".to_owned(), |value| value.to_string())
            )));
        }

        let record: Self = serde_json::from_value(document)
            .map_err(|error| AppError::Internal(format!("failed to decode role: {error}")))?;

        Ok(RoleDefinition::from_parts(
            record.credential_strategy,
            record.pool_domain_or_url,
            record.application_client_id,
            record.application_client_secret,
            record.region,
            record.user_pool_id,
            record.group_name,
            record.dummy_email_domain,
            Duration::from_secs(record.ttl_seconds),
            Duration::from_secs(record.max_ttl_seconds),
        ))
    }
}
