use std::time::Duration;

use broker_application::{ProviderAccessUpdate, RedactedAccessConfig};
use broker_core::AppResult;
use broker_domain::{CredentialResult, CredentialStrategy, RoleDefinition, RoleName, RoleUpdate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lease_ledger::LeaseRecord;

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Remote-access configuration write payload.
#[derive(Debug, Deserialize)]
pub struct ConfigRequest {
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_session_token: Option<String>,
}

impl From<ConfigRequest> for ProviderAccessUpdate {
    fn from(value: ConfigRequest) -> Self {
        Self {
            aws_access_key_id: value.aws_access_key_id,
            aws_secret_access_key: value.aws_secret_access_key,
            aws_session_token: value.aws_session_token,
        }
    }
}

/// Remote-access configuration with secrets redacted.
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub aws_access_key_id: String,
    pub has_secret_access_key: bool,
    pub has_session_token: bool,
}

impl From<RedactedAccessConfig> for ConfigResponse {
    fn from(value: RedactedAccessConfig) -> Self {
        Self {
            aws_access_key_id: value.aws_access_key_id,
            has_secret_access_key: value.has_secret_access_key,
            has_session_token: value.has_session_token,
        }
    }
}

/// Role create or update payload. Omitted fields keep their stored value.
///
/// Field names of the older `credential_type` schema are accepted as aliases.
#[derive(Debug, Default, Deserialize)]
pub struct RoleRequest {
    #[serde(alias = "credential_type")]
    pub credential_strategy: Option<String>,
    #[serde(alias = "cognito_pool_domain")]
    pub pool_domain_or_url: Option<String>,
    #[serde(alias = "app_client_id")]
    pub application_client_id: Option<String>,
    #[serde(alias = "app_client_secret")]
    pub application_client_secret: Option<String>,
    pub region: Option<String>,
    pub user_pool_id: Option<String>,
    #[serde(alias = "group")]
    pub group_name: Option<String>,
    pub dummy_email_domain: Option<String>,
    /// Seconds.
    pub ttl: Option<u64>,
    /// Seconds.
    pub max_ttl: Option<u64>,
}

impl RoleRequest {
    pub fn into_update(self) -> AppResult<RoleUpdate> {
        Ok(RoleUpdate {
            credential_strategy: self
                .credential_strategy
                .as_deref()
                .map(parse_credential_strategy)
                .transpose()?,
            pool_domain_or_url: self.pool_domain_or_url,
            application_client_id: self.application_client_id,
            application_client_secret: self.application_client_secret,
            region: self.region,
            user_pool_id: self.user_pool_id,
            group_name: self.group_name,
            dummy_email_domain: self.dummy_email_domain,
            ttl: self.ttl.map(Duration::from_secs),
            max_ttl: self.max_ttl.map(Duration::from_secs),
        })
    }
}

fn parse_credential_strategy(value: &str) -> AppResult<CredentialStrategy> {
    match value.trim().to_lowercase().as_str() {
        "client_credentials_grant" => Ok(CredentialStrategy::DelegatedGrant),
        "user" => Ok(CredentialStrategy::EphemeralIdentity),
        other => other.parse(),
    }
}

/// Role read response showing the fields of its strategy.
///
/// The client secret is never returned.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub name: String,
    pub credential_strategy: CredentialStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_domain_or_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_application_client_secret: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_pool_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dummy_email_domain: Option<String>,
    pub ttl: u64,
    pub max_ttl: u64,
}

impl RoleResponse {
    pub fn new(name: &RoleName, role: &RoleDefinition) -> Self {
        let client_id = role.application_client_id().map(str::to_owned);
        let mut response = Self {
            name: name.to_string(),
            credential_strategy: role.credential_strategy(),
            pool_domain_or_url: None,
            application_client_id: client_id,
            has_application_client_secret: None,
            region: None,
            user_pool_id: None,
            group_name: None,
            dummy_email_domain: None,
            ttl: role.ttl().as_secs(),
            max_ttl: role.max_ttl().as_secs(),
        };

        match role.credential_strategy() {
            CredentialStrategy::DelegatedGrant => {
                response.pool_domain_or_url = Some(role.pool_domain_or_url().to_owned());
                response.has_application_client_secret =
                    Some(!role.application_client_secret().is_empty());
            }
            CredentialStrategy::EphemeralIdentity => {
                response.region = Some(role.region().to_owned());
                response.user_pool_id = Some(role.user_pool_id().to_owned());
                response.group_name = Some(role.group_name().to_owned());
                response.dummy_email_domain = Some(role.dummy_email_domain().to_owned());
            }
        }

        response
    }
}

/// Role name listing.
#[derive(Debug, Serialize)]
pub struct RoleListResponse {
    pub keys: Vec<String>,
}

/// Issued credential with optional lease.
#[derive(Debug, Serialize)]
pub struct CredentialResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lease_id: Option<String>,
    pub lease_duration: u64,
    pub renewable: bool,
    pub data: CredentialResult,
}

/// Lease state after a renew.
#[derive(Debug, Serialize)]
pub struct LeaseResponse {
    pub lease_id: String,
    pub lease_duration: u64,
    pub expires_at: DateTime<Utc>,
    pub max_expires_at: DateTime<Utc>,
}

impl From<LeaseRecord> for LeaseResponse {
    fn from(value: LeaseRecord) -> Self {
        let lease_duration = u64::try_from(
            (value.expires_at - Utc::now()).num_seconds().max(0),
        )
        .unwrap_or_default();

        Self {
            lease_id: value.lease_id,
            lease_duration,
            expires_at: value.expires_at,
            max_expires_at: value.max_expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use broker_domain::CredentialStrategy;
    use serde_json::json;

    use super::RoleRequest;

    #[test]
    fn legacy_field_names_and_strategy_values_are_accepted() {
        let request: Result<RoleRequest, _> = serde_json::from_value(json!({
            "credential_type": "user",
            "app_client_id": "client",
            "group": "adviser",
            "ttl": 20,
            "max_ttl": 30,
        }));
        assert!(request.is_ok());

        let update = request.unwrap_or_default().into_update();
        assert!(update.is_ok());
        let update = update.unwrap_or_default();
        assert_eq!(
            update.credential_strategy,
            Some(CredentialStrategy::EphemeralIdentity)
        );
        assert_eq!(update.group_name.as_deref(), Some("adviser"));
        assert_eq!(update.ttl.map(|ttl| ttl.as_secs()), Some(20));
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let request = RoleRequest {
            credential_strategy: Some("password".to_owned()),
            ..RoleRequest::default()
        };

        assert!(request.into_update().is_err());
    }
}
