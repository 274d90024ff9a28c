use std::sync::Arc;

use async_trait::async_trait;
use broker_core::ProviderError;
use broker_domain::{EphemeralUser, ProviderAccessConfig, TokenGrant};

/// Parameters for a delegated grant token exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatedGrantRequest {
    /// Token endpoint domain or full URL.
    pub pool_domain_or_url: String,
    /// Application client id, when the provider expects one.
    pub application_client_id: Option<String>,
    /// Application client secret.
    pub application_client_secret: String,
}

/// Parameters for provisioning one ephemeral identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EphemeralIdentityRequest {
    /// Provider region.
    pub region: String,
    /// Application client used to log the identity in.
    pub application_client_id: String,
    /// User pool the identity is created in.
    pub user_pool_id: String,
    /// Group the identity joins.
    pub group_name: String,
    /// Email domain used to synthesize the username.
    pub dummy_email_domain: String,
}

/// Capability port for every remote identity provider interaction.
///
/// Calls are made once; failures surface unchanged and retrying is the
/// caller's decision.
#[async_trait]
pub trait IdentityProviderClient: Send + Sync {
    /// Exchanges an application secret for a bearer token.
    async fn exchange_grant(
        &self,
        request: &DelegatedGrantRequest,
    ) -> Result<TokenGrant, ProviderError>;

    /// Provisions a new identity and logs it in.
    async fn create_ephemeral_identity(
        &self,
        request: &EphemeralIdentityRequest,
    ) -> Result<EphemeralUser, ProviderError>;

    /// Deletes an identity from its user pool.
    async fn delete_identity(
        &self,
        region: &str,
        user_pool_id: &str,
        username: &str,
    ) -> Result<(), ProviderError>;
}

/// Builds provider clients from the current remote-access configuration.
#[async_trait]
pub trait IdentityProviderClientFactory: Send + Sync {
    /// Builds a client. `None` selects the ambient credential chain.
    async fn build_client(
        &self,
        access: Option<&ProviderAccessConfig>,
    ) -> Result<Arc<dyn IdentityProviderClient>, ProviderError>;
}
