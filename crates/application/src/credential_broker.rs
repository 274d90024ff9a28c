//! Credential issuance and lease lifecycle callbacks.

mod issue;
mod lease_lifecycle;


use std::sync::Arc;

use broker_core::AppResult;
use broker_domain::{CredentialResult, LeaseBounds, LeaseMetadata};

use crate::{ClientCache, ConfigStore, IdentityProviderClient, RoleStore};

/// Lease terms attached to an issued credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseTerms {
    /// Requested validity window.
    pub bounds: LeaseBounds,
    /// Data handed back on renew and revoke.
    pub metadata: LeaseMetadata,
}

/// Credential returned by [`CredentialBroker::issue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCredential {
    /// Public response data.
    pub data: CredentialResult,
    /// Lease terms, absent when there is nothing to revoke.
    pub lease: Option<LeaseTerms>,
}

/// Issues credentials per role and handles lease renew and revoke.
#[derive(Clone)]
pub struct CredentialBroker {
    roles: RoleStore,
    config: ConfigStore,
    clients: Arc<ClientCache>,
}

impl CredentialBroker {
    /// Creates a broker over the role store, config store and shared client.
    #[must_use]
    pub fn new(roles: RoleStore, config: ConfigStore, clients: Arc<ClientCache>) -> Self {
        Self {
            roles,
            config,
            clients,
        }
    }

    async fn client(&self) -> AppResult<Arc<dyn IdentityProviderClient>> {
        let config = &self.config;
        self.clients
            .get_or_create(move || async move { config.load().await })
            .await
    }
}
