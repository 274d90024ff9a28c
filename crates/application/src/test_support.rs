use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use broker_core::{AppError, AppResult};

use crate::SecretStorage;

/// Map-backed storage shared by service tests.
#[derive(Default)]
pub(crate) struct FakeStorage {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl FakeStorage {
    pub(crate) fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    pub(crate) fn insert_raw(&self, key: &str, value: &[u8]) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_owned(), value.to_vec());
        }
    }
}

fn poisoned(error: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("fake storage lock poisoned: {error}"))
}

#[async_trait]
impl SecretStorage for FakeStorage {
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        let entries = self.entries.lock().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> AppResult<()> {
        let mut entries = self.entries.lock().map_err(poisoned)?;
        entries.insert(key.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut entries = self.entries.lock().map_err(poisoned)?;
        entries.remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> AppResult<Vec<String>> {
        let entries = self.entries.lock().map_err(poisoned)?;
        let mut names: Vec<String> = entries
            .keys()
            .filter_map(|key| key.strip_prefix(prefix))
            .map(|rest| rest.split('/').next().unwrap_or(rest).to_owned())
            .collect();
        names.dedup();
        Ok(names)
    }
}
