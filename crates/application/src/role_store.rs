//! Persisted role definitions keyed by name.

mod record;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use broker_core::{AppError, AppResult};
use broker_domain::{RoleDefinition, RoleName, RoleUpdate};
use tracing::info;

use crate::SecretStorage;

use record::StoredRole;

/// Storage prefix for role records.
pub(crate) const ROLE_KEY_PREFIX: &str = "roles/";

/// Whether a write must create a new role or modify an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// The role must not exist yet.
    Create,
    /// The role must already exist.
    Update,
}

/// Data access for role definitions.
///
/// Concurrent writers to the same name race last-write-wins; atomicity is
/// whatever the storage backend provides per key.
#[derive(Clone)]
pub struct RoleStore {
    storage: Arc<dyn SecretStorage>,
}

impl RoleStore {
    /// Creates a role store over the given storage.
    #[must_use]
    pub fn new(storage: Arc<dyn SecretStorage>) -> Self {
        Self { storage }
    }

    /// Loads a role, returning `None` when it does not exist.
    pub async fn read(&self, name: &RoleName) -> AppResult<Option<RoleDefinition>> {
        let Some(bytes) = self.storage.get(role_key(name).as_str()).await? else {
            return Ok(None);
        };

        StoredRole::decode(bytes.as_slice()).map(Some)
    }

    /// Creates or updates a role by merging the supplied fields.
    ///
    /// Nothing is persisted when the merged role violates an invariant.
    pub async fn write(
        &self,
        name: &RoleName,
        mode: WriteMode,
        update: RoleUpdate,
    ) -> AppResult<RoleDefinition> {
        let existing = self.read(name).await?;

        let mut role = match (mode, existing) {
            (WriteMode::Create, Some(_)) => {
                return Err(AppError::Validation(format!(
                    "role '{name}' already exists"
                )));
            }
            (WriteMode::Create, None) => {
                RoleDefinition::new(update.credential_strategy.unwrap_or_default())
            }
            (WriteMode::Update, Some(role)) => role,
            (WriteMode::Update, None) => {
                return Err(AppError::Validation(format!(
                    "role '{name}' not found during update operation"
                )));
            }
        };

        role.apply(update)?;

        let bytes = StoredRole::encode(&role)?;
        self.storage.put(role_key(name).as_str(), bytes).await?;

        info!(
            role = %name,
            strategy = role.credential_strategy().as_str(),
            created = matches!(mode, WriteMode::Create),
            "stored role"
        );

        Ok(role)
    }

    /// Deletes a role. Deleting an absent role succeeds.
    pub async fn delete(&self, name: &RoleName) -> AppResult<()> {
        self.storage.delete(role_key(name).as_str()).await?;
        info!(role = %name, "deleted role");
        Ok(())
    }

    /// Lists all role names.
    pub async fn list(&self) -> AppResult<Vec<String>> {
        self.storage.list(ROLE_KEY_PREFIX).await
    }
}

fn role_key(name: &RoleName) -> String {
    format!("{ROLE_KEY_PREFIX}{name}")
}
