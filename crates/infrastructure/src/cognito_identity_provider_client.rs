//! Identity provider client backed by Cognito user pools.

mod pool_admin;
mod token_exchange;

use async_trait::async_trait;
use aws_config::SdkConfig;
use broker_application::{
    DelegatedGrantRequest, EphemeralIdentityRequest, IdentityPoolAdmin, IdentityProviderClient,
    provision_ephemeral_identity,
};
use broker_core::ProviderError;
use broker_domain::{EphemeralUser, TokenGrant};

use pool_admin::CognitoPoolAdmin;

/// Cognito implementation of the identity provider client port.
///
/// Token exchanges go through the shared HTTP client; admin calls use a
/// per-region SDK client derived from the loaded SDK configuration.
pub struct CognitoIdentityProviderClient {
    http_client: reqwest::Client,
    sdk_config: SdkConfig,
}

impl CognitoIdentityProviderClient {
    /// Creates a client from an HTTP client and loaded SDK configuration.
    #[must_use]
    pub fn new(http_client: reqwest::Client, sdk_config: SdkConfig) -> Self {
        Self {
            http_client,
            sdk_config,
        }
    }

    fn pool_admin(&self, region: &str) -> CognitoPoolAdmin {
        CognitoPoolAdmin::new(&self.sdk_config, region)
    }
}

#[async_trait]
impl IdentityProviderClient for CognitoIdentityProviderClient {
    async fn exchange_grant(
        &self,
        request: &DelegatedGrantRequest,
    ) -> Result<TokenGrant, ProviderError> {
        token_exchange::exchange(&self.http_client, request).await
    }

    async fn create_ephemeral_identity(
        &self,
        request: &EphemeralIdentityRequest,
    ) -> Result<EphemeralUser, ProviderError> {
        let admin = self.pool_admin(request.region.as_str());
        provision_ephemeral_identity(&admin, request).await
    }

    async fn delete_identity(
        &self,
        region: &str,
        user_pool_id: &str,
        username: &str,
    ) -> Result<(), ProviderError> {
        self.pool_admin(region)
            .delete_user(user_pool_id, username)
            .await
    }
}
