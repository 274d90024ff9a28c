use broker_core::{AppError, AppResult};
use broker_domain::{CredentialStrategy, LeaseBounds, LeaseMetadata, RoleName};
use tracing::{info, warn};

use super::CredentialBroker;

impl CredentialBroker {
    /// Returns refreshed lease bounds for an outstanding lease.
    ///
    /// `None` leaves the current bounds untouched: the role is gone or its
    /// strategy has nothing to renew.
    pub async fn renew(&self, metadata: &LeaseMetadata) -> AppResult<Option<LeaseBounds>> {
        let name = lease_role_name(metadata)?;
        let Some(role) = self.roles.read(&name).await? else {
            info!(role = %name, "role no longer exists, lease bounds unchanged");
            return Ok(None);
        };

        match role.credential_strategy() {
            CredentialStrategy::DelegatedGrant => Ok(None),
            CredentialStrategy::EphemeralIdentity => {
                Ok(Some(LeaseBounds::new(role.ttl(), role.max_ttl())))
            }
        }
    }

    /// Tears down whatever an issued lease created.
    pub async fn revoke(&self, metadata: &LeaseMetadata) -> AppResult<()> {
        let username = metadata.require_username()?;
        let name = lease_role_name(metadata)?;
        let role = self.roles.read(&name).await?;

        let (region, user_pool_id) = match role.as_ref() {
            Some(role) if role.credential_strategy() == CredentialStrategy::DelegatedGrant => {
                return Ok(());
            }
            Some(role) => (
                metadata
                    .region
                    .clone()
                    .unwrap_or_else(|| role.region().to_owned()),
                metadata
                    .user_pool_id
                    .clone()
                    .unwrap_or_else(|| role.user_pool_id().to_owned()),
            ),
            None => match (metadata.region.clone(), metadata.user_pool_id.clone()) {
                (Some(region), Some(user_pool_id)) => (region, user_pool_id),
                _ => {
                    warn!(
                        role = %name,
                        username = %username,
                        "role no longer exists and lease carries no pool location, nothing to delete"
                    );
                    return Ok(());
                }
            },
        };

        let client = self.client().await?;
        if let Err(error) = client
            .delete_identity(region.as_str(), user_pool_id.as_str(), username)
            .await
        {
            warn!(
                role = %name,
                username = %username,
                error = %error,
                "failed to delete ephemeral identity"
            );
            return Err(AppError::upstream(format!("role '{name}'"), error));
        }

        info!(role = %name, username = %username, "revoked ephemeral identity");
        Ok(())
    }
}

fn lease_role_name(metadata: &LeaseMetadata) -> AppResult<RoleName> {
    RoleName::new(metadata.role_name.as_str()).map_err(|error| {
        AppError::InternalData(format!("internal data 'role' is invalid: {error}"))
    })
}
