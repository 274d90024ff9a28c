use std::collections::BTreeMap;

use async_trait::async_trait;
use broker_application::SecretStorage;
use broker_core::AppResult;
use tokio::sync::RwLock;

/// Process-local storage adapter. Contents are lost on restart.
#[derive(Default)]
pub struct InMemorySecretStorage {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemorySecretStorage {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStorage for InMemorySecretStorage {
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> AppResult<()> {
        self.entries.write().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> AppResult<Vec<String>> {
        let entries = self.entries.read().await;
        let keys = entries
            .range(prefix.to_owned()..)
            .map(|(key, _)| key.as_str())
            .take_while(|key| key.starts_with(prefix));

        Ok(crate::child_names(prefix, keys))
    }
}
