use std::sync::Arc;

use broker_core::{AppError, AppResult};
use broker_domain::ProviderAccessConfig;
use serde::Serialize;
use tracing::info;

use crate::{ClientCache, SecretStorage};

/// Storage key of the remote-access configuration record.
pub(crate) const CONFIG_KEY: &str = "config";

/// Fields supplied by a configuration write. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderAccessUpdate {
    /// Access key id.
    pub aws_access_key_id: Option<String>,
    /// Secret access key.
    pub aws_secret_access_key: Option<String>,
    /// Session token.
    pub aws_session_token: Option<String>,
}

/// Configuration view that never exposes secret material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedactedAccessConfig {
    /// Access key id.
    pub aws_access_key_id: String,
    /// Whether a secret access key is stored.
    pub has_secret_access_key: bool,
    /// Whether a session token is stored.
    pub has_session_token: bool,
}

impl From<&ProviderAccessConfig> for RedactedAccessConfig {
    fn from(value: &ProviderAccessConfig) -> Self {
        Self {
            aws_access_key_id: value.aws_access_key_id.clone(),
            has_secret_access_key: !value.aws_secret_access_key.is_empty(),
            has_session_token: value.session_token().is_some(),
        }
    }
}

/// Persisted remote-access configuration.
///
/// Every successful write or delete resets the shared client so the next use
/// picks up the new settings.
#[derive(Clone)]
pub struct ConfigStore {
    storage: Arc<dyn SecretStorage>,
    clients: Arc<ClientCache>,
}

impl ConfigStore {
    /// Creates a configuration store.
    #[must_use]
    pub fn new(storage: Arc<dyn SecretStorage>, clients: Arc<ClientCache>) -> Self {
        Self { storage, clients }
    }

    /// Loads the stored configuration, if any.
    pub async fn load(&self) -> AppResult<Option<ProviderAccessConfig>> {
        let Some(bytes) = self.storage.get(CONFIG_KEY).await? else {
            return Ok(None);
        };

        serde_json::from_slice(bytes.as_slice())
            .map(Some)
            .map_err(|error| AppError::Internal(format!("failed to decode config: {error}")))
    }

    /// Returns the stored configuration with secrets redacted.
    pub async fn read(&self) -> AppResult<Option<RedactedAccessConfig>> {
        Ok(self.load().await?.as_ref().map(RedactedAccessConfig::from))
    }

    /// Merges the supplied fields onto the stored configuration.
    pub async fn write(&self, update: ProviderAccessUpdate) -> AppResult<RedactedAccessConfig> {
        let config = self
            .clients
            .reset_with(|| self.merge_and_store(update))
            .await?;

        info!(
            static_credentials = config.has_static_credentials(),
            "stored provider access config"
        );

        Ok(RedactedAccessConfig::from(&config))
    }

    /// Removes the stored configuration.
    pub async fn delete(&self) -> AppResult<()> {
        self.clients
            .reset_with(|| self.storage.delete(CONFIG_KEY))
            .await?;
        info!("deleted provider access config");
        Ok(())
    }

    async fn merge_and_store(
        &self,
        update: ProviderAccessUpdate,
    ) -> AppResult<ProviderAccessConfig> {
        let mut config = self.load().await?.unwrap_or_default();

        if let Some(value) = update.aws_access_key_id {
            config.aws_access_key_id = value;
        }
        if let Some(value) = update.aws_secret_access_key {
            config.aws_secret_access_key = value;
        }
        if let Some(value) = update.aws_session_token {
            config.aws_session_token = value;
        }

        if config.aws_access_key_id.is_empty() != config.aws_secret_access_key.is_empty() {
            return Err(AppError::Validation(
                "aws_access_key_id and aws_secret_access_key must be set together".to_owned(),
            ));
        }

        let bytes = serde_json::to_vec(&config)
            .map_err(|error| AppError::Internal(format!("failed to encode config: {error}")))?;
        self.storage.put(CONFIG_KEY, bytes).await?;
        Ok(config)
    }
}
