//! Credential broker API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dto;
mod error;
mod handlers;
mod lease_ledger;
mod lease_sweeper;
mod middleware;
mod state;

use std::sync::Arc;

use broker_application::{ClientCache, ConfigStore, CredentialBroker, RoleStore, SecretStorage};
use broker_core::AppError;
use broker_infrastructure::{CognitoClientFactory, InMemorySecretStorage, PostgresSecretStorage};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::api_config::{ApiConfig, StorageBackend};
use crate::lease_ledger::{LeaseLedger, LeasePolicy};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let storage = build_storage(&config.storage_backend).await?;

    let http_client = reqwest::Client::builder()
        .timeout(config.token_http_timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let clients = Arc::new(ClientCache::new(Arc::new(CognitoClientFactory::new(
        http_client,
    ))));
    let role_store = RoleStore::new(storage.clone());
    let config_store = ConfigStore::new(storage.clone(), clients.clone());
    let credential_broker =
        CredentialBroker::new(role_store.clone(), config_store.clone(), clients);
    let lease_ledger = LeaseLedger::new(
        storage,
        credential_broker.clone(),
        LeasePolicy {
            default_ttl: config.lease_default_ttl,
            max_ttl: config.lease_max_ttl,
        },
    );

    lease_sweeper::spawn_lease_sweeper(lease_ledger.clone(), config.lease_sweep_interval);

    let app = api_router::build_router(AppState {
        role_store,
        config_store,
        credential_broker,
        lease_ledger,
        api_token: Arc::from(config.api_token.as_str()),
    });

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind {address}: {error}")))?;

    info!(%address, "credential broker api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("server error: {error}")))
}

async fn build_storage(backend: &StorageBackend) -> Result<Arc<dyn SecretStorage>, AppError> {
    match backend {
        StorageBackend::Memory => {
            warn!("using in-memory storage, roles and leases are lost on restart");
            Ok(Arc::new(InMemorySecretStorage::new()))
        }
        StorageBackend::Postgres { database_url } => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to connect to database: {error}"))
                })?;

            sqlx::migrate!("../../crates/infrastructure/migrations")
                .run(&pool)
                .await
                .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

            info!("database migrations applied");
            Ok(Arc::new(PostgresSecretStorage::new(pool)))
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
