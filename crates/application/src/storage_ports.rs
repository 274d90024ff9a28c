use async_trait::async_trait;
use broker_core::AppResult;

/// Byte-oriented persisted storage keyed by path.
///
/// Implementations provide per-key linearizable get/put/delete; the broker
/// adds no locking of its own around them.
#[async_trait]
pub trait SecretStorage: Send + Sync {
    /// Returns the stored value, or `None` when the key is absent.
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>>;

    /// Stores a value, replacing any previous one.
    async fn put(&self, key: &str, value: Vec<u8>) -> AppResult<()>;

    /// Removes a key. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Lists the immediate child names below `prefix`, sorted.
    ///
    /// `prefix` must end with `/`.
    async fn list(&self, prefix: &str) -> AppResult<Vec<String>>;
}
