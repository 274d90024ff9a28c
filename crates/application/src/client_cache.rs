use std::future::Future;
use std::sync::Arc;

use broker_core::{AppError, AppResult};
use broker_domain::ProviderAccessConfig;
use tokio::sync::RwLock;
use tracing::info;

use crate::{IdentityProviderClient, IdentityProviderClientFactory};

/// Lazily built, shared identity provider client.
///
/// At most one client is built per reset epoch. Readers share the cached
/// instance under a read lock; construction and reset serialize on the write
/// lock.
pub struct ClientCache {
    factory: Arc<dyn IdentityProviderClientFactory>,
    client: RwLock<Option<Arc<dyn IdentityProviderClient>>>,
}

impl ClientCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(factory: Arc<dyn IdentityProviderClientFactory>) -> Self {
        Self {
            factory,
            client: RwLock::new(None),
        }
    }

    /// Returns the cached client, building it on first use.
    ///
    /// `load_access` is only awaited when a client has to be built.
    pub async fn get_or_create<F, Fut>(
        &self,
        load_access: F,
    ) -> AppResult<Arc<dyn IdentityProviderClient>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<Option<ProviderAccessConfig>>>,
    {
        if let Some(client) = self.client.read().await.as_ref() {
            return Ok(Arc::clone(client));
        }

        let mut slot = self.client.write().await;
        if let Some(client) = slot.as_ref() {
            return Ok(Arc::clone(client));
        }

        let access = load_access().await?;
        let client = self
            .factory
            .build_client(access.as_ref())
            .await
            .map_err(|error| AppError::upstream("provider client", error))?;

        info!(
            static_credentials = access
                .as_ref()
                .is_some_and(ProviderAccessConfig::has_static_credentials),
            "built identity provider client"
        );

        *slot = Some(Arc::clone(&client));
        Ok(client)
    }

    /// Runs `apply` under the write lock and drops the cached client if it
    /// succeeds, so the next use rebuilds it.
    ///
    /// No caller can observe the client built before `apply` once `apply` has
    /// started. On error the cached client is kept.
    pub async fn reset_with<F, Fut, T>(&self, apply: F) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let mut slot = self.client.write().await;
        let outcome = apply().await?;
        if slot.take().is_some() {
            info!("reset identity provider client");
        }
        Ok(outcome)
    }

    /// Returns true when a client is currently cached.
    pub async fn is_populated(&self) -> bool {
        self.client.read().await.is_some()
    }
}
