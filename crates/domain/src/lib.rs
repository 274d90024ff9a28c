//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod credential;
mod lease;
mod provider_config;
mod role;

pub use credential::{CredentialResult, EphemeralUser, TokenGrant};
pub use lease::{LeaseBounds, LeaseMetadata};
pub use provider_config::ProviderAccessConfig;
pub use role::{
    CredentialStrategy, ROLE_NAME_MAX_LENGTH, RoleDefinition, RoleName, RoleUpdate,
};
