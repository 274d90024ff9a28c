use broker_core::{AppError, AppResult};
use broker_domain::{
    CredentialResult, CredentialStrategy, LeaseBounds, LeaseMetadata, RoleDefinition, RoleName,
};
use tracing::info;

use super::{CredentialBroker, IssuedCredential, LeaseTerms};
use crate::{DelegatedGrantRequest, EphemeralIdentityRequest};

impl CredentialBroker {
    /// Issues a credential for the named role.
    pub async fn issue(&self, name: &RoleName) -> AppResult<IssuedCredential> {
        let Some(role) = self.roles.read(name).await? else {
            return Err(AppError::NotFound(format!("role '{name}' does not exist")));
        };

        let client = self.client().await?;

        match role.credential_strategy() {
            CredentialStrategy::DelegatedGrant => {
                let token = client
                    .exchange_grant(&delegated_request(&role))
                    .await
                    .map_err(|error| AppError::upstream(format!("role '{name}'"), error))?;

                info!(role = %name, "issued delegated grant token");

                Ok(IssuedCredential {
                    data: CredentialResult::DelegatedToken(token),
                    lease: None,
                })
            }
            CredentialStrategy::EphemeralIdentity => {
                let user = client
                    .create_ephemeral_identity(&ephemeral_request(&role))
                    .await
                    .map_err(|error| AppError::upstream(format!("role '{name}'"), error))?;

                info!(
                    role = %name,
                    username = %user.username,
                    "issued ephemeral identity"
                );

                let metadata = LeaseMetadata::for_identity(
                    user.username.as_str(),
                    name.as_str(),
                    role.region(),
                    role.user_pool_id(),
                );

                Ok(IssuedCredential {
                    data: CredentialResult::EphemeralUser(user),
                    lease: Some(LeaseTerms {
                        bounds: LeaseBounds::new(role.ttl(), role.max_ttl()),
                        metadata,
                    }),
                })
            }
        }
    }
}

fn delegated_request(role: &RoleDefinition) -> DelegatedGrantRequest {
    DelegatedGrantRequest {
        pool_domain_or_url: role.pool_domain_or_url().to_owned(),
        application_client_id: role.application_client_id().map(str::to_owned),
        application_client_secret: role.application_client_secret().to_owned(),
    }
}

fn ephemeral_request(role: &RoleDefinition) -> EphemeralIdentityRequest {
    EphemeralIdentityRequest {
        region: role.region().to_owned(),
        application_client_id: role.application_client_id().unwrap_or_default().to_owned(),
        user_pool_id: role.user_pool_id().to_owned(),
        group_name: role.group_name().to_owned(),
        dummy_email_domain: role.dummy_email_domain().to_owned(),
    }
}
