use async_trait::async_trait;

use super::errors::RepositoryError;

/// String key to string value storage, the local-storage shaped backend every store sits on
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError>;

    /// Store `value` under `key`, replacing any previous value
    async fn put(&self, key: &str, value: &str) -> Result<(), RepositoryError>;

    /// Delete `key` if present
    async fn remove(&self, key: &str) -> Result<(), RepositoryError>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        (**self).put(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), RepositoryError> {
        (**self).remove(key).await
    }
}
