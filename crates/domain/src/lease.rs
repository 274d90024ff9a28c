use std::time::Duration;

use broker_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lease validity window requested for an issued credential.
///
/// A zero duration lets the host apply its own default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaseBounds {
    /// Lease duration granted per issue or renew.
    pub ttl: Duration,
    /// Upper bound on the total lease lifetime.
    pub max_ttl: Duration,
}

impl LeaseBounds {
    /// Creates lease bounds.
    #[must_use]
    pub fn new(ttl: Duration, max_ttl: Duration) -> Self {
        Self { ttl, max_ttl }
    }
}

/// Data stashed with a lease at issuance and handed back on renew or revoke.
///
/// The host stores this document opaquely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseMetadata {
    /// Identity created for the lease.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Role the credential was issued for.
    #[serde(rename = "role")]
    pub role_name: String,
    /// Region the identity was created in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// User pool the identity was created in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_pool_id: Option<String>,
}

impl LeaseMetadata {
    /// Creates metadata for an ephemeral identity.
    #[must_use]
    pub fn for_identity(
        username: impl Into<String>,
        role_name: impl Into<String>,
        region: impl Into<String>,
        user_pool_id: impl Into<String>,
    ) -> Self {
        Self {
            username: Some(username.into()),
            role_name: role_name.into(),
            region: Some(region.into()),
            user_pool_id: Some(user_pool_id.into()),
        }
    }

    /// Parses metadata handed back by the host.
    pub fn from_internal_data(value: &Value) -> AppResult<Self> {
        if value.get("role").and_then(Value::as_str).is_none() {
            return Err(AppError::InternalData(
                "internal data 'role' not found".to_owned(),
            ));
        }

        serde_json::from_value(value.clone()).map_err(|error| {
            AppError::InternalData(format!("lease internal data is malformed: {error}"))
        })
    }

    /// Serializes metadata for the host.
    pub fn to_internal_data(&self) -> AppResult<Value> {
        serde_json::to_value(self).map_err(|error| {
            AppError::Internal(format!("failed to encode lease internal data: {error}"))
        })
    }

    /// Returns the username or reports the missing field.
    pub fn require_username(&self) -> AppResult<&str> {
        self.username
            .as_deref()
            .filter(|username| !username.is_empty())
            .ok_or_else(|| AppError::InternalData("internal data 'username' not found".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use broker_core::AppError;
    use serde_json::json;

    use super::LeaseMetadata;

    #[test]
    fn internal_data_without_username_parses_but_is_not_revocable() {
        let metadata = LeaseMetadata::from_internal_data(&json!({"role": "ops"}));
        assert!(metadata.is_ok());
        let metadata = metadata.unwrap_or_else(|_| unreachable!());
        assert!(matches!(
            metadata.require_username(),
            Err(AppError::InternalData(_))
        ));
    }

    #[test]
    fn internal_data_without_role_is_rejected() {
        let metadata = LeaseMetadata::from_internal_data(&json!({"username": "vaultabc@x.io"}));
        assert!(matches!(metadata, Err(AppError::InternalData(_))));
    }

    #[test]
    fn internal_data_uses_host_field_names() {
        let metadata = LeaseMetadata::for_identity("u@x.io", "ops", "eu-west-1", "pool");
        let encoded = metadata.to_internal_data();
        assert!(encoded.is_ok());
        assert_eq!(
            encoded.unwrap_or_default(),
            json!({
                "username": "u@x.io",
                "role": "ops",
                "region": "eu-west-1",
                "user_pool_id": "pool",
            })
        );
    }
}
