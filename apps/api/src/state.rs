use std::sync::Arc;

use broker_application::{ConfigStore, CredentialBroker, RoleStore};

use crate::lease_ledger::LeaseLedger;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub role_store: RoleStore,
    pub config_store: ConfigStore,
    pub credential_broker: CredentialBroker,
    pub lease_ledger: LeaseLedger,
    pub api_token: Arc<str>,
}
