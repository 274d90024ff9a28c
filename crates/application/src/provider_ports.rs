mod client;
mod pool_admin;

pub use client::{
    DelegatedGrantRequest, EphemeralIdentityRequest, IdentityProviderClient,
    IdentityProviderClientFactory,
};
pub use pool_admin::{AuthenticationTokens, IdentityPoolAdmin};
