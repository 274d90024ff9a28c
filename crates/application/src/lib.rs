//! Application services and ports for the credential broker.

#![forbid(unsafe_code)]

mod client_cache;
mod config_store;
mod credential_broker;
mod ephemeral_provisioning;
mod provider_ports;
mod role_store;
mod storage_ports;

#[cfg(test)]
mod test_support;

pub use client_cache::ClientCache;
pub use config_store::{ConfigStore, ProviderAccessUpdate, RedactedAccessConfig};
pub use credential_broker::{CredentialBroker, IssuedCredential, LeaseTerms};
pub use ephemeral_provisioning::provision_ephemeral_identity;
pub use provider_ports::{
    AuthenticationTokens, DelegatedGrantRequest, EphemeralIdentityRequest, IdentityPoolAdmin,
    IdentityProviderClient, IdentityProviderClientFactory,
};
pub use role_store::{RoleStore, WriteMode};
pub use storage_ports::SecretStorage;
