//! Persistent Slot Storage Abstraction
//!
//! Provides a platform-agnostic trait for string-keyed, string-valued
//! persistent storage. This is the host equivalent of browser local storage:
//! one namespace per storage origin, last write wins, no transactions.

use async_trait::async_trait;

use crate::error::Result;

/// String-keyed persistent storage trait
///
/// Abstracts the host's local persistent storage:
/// - Desktop: JSON file in the user data directory
/// - Tests: in-memory map
/// - Webview shells: `window.localStorage`
///
/// # Semantics
///
/// - `set_item` overwrites any previous value for the key
/// - `remove_item` is idempotent and succeeds for missing keys
/// - Values are stored verbatim; callers are responsible for any encoding
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::KeyValueStore;
///
/// async fn remember_theme(store: &dyn KeyValueStore) -> Result<()> {
///     store.set_item("theme", "dark").await?;
///     assert_eq!(store.get_item("theme").await?.as_deref(), Some("dark"));
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Implementations return [`BridgeError::QuotaExceeded`](crate::BridgeError::QuotaExceeded)
    /// when the backing storage is full.
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value stored under `key`
    async fn remove_item(&self, key: &str) -> Result<()>;

    /// List all keys currently stored
    async fn keys(&self) -> Result<Vec<String>>;

    /// Check whether a key exists without returning its value
    async fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.get_item(key).await?.is_some())
    }

    /// Remove several keys in one call
    ///
    /// The default implementation removes keys one at a time and stops at the
    /// first failure.
    async fn remove_items(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.remove_item(key).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        Store {}

        #[async_trait]
        impl KeyValueStore for Store {
            async fn get_item(&self, key: &str) -> Result<Option<String>>;
            async fn set_item(&self, key: &str, value: &str) -> Result<()>;
            async fn remove_item(&self, key: &str) -> Result<()>;
            async fn keys(&self) -> Result<Vec<String>>;
        }
    }

    #[tokio::test]
    async fn test_contains_key_uses_get_item() {
        let mut store = MockStore::new();
        store
            .expect_get_item()
            .with(eq("present"))
            .returning(|_| Ok(Some("value".to_string())));
        store
            .expect_get_item()
            .with(eq("missing"))
            .returning(|_| Ok(None));

        assert!(store.contains_key("present").await.unwrap());
        assert!(!store.contains_key("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_items_removes_each_key() {
        let mut store = MockStore::new();
        store.expect_remove_item().times(3).returning(|_| Ok(()));

        store.remove_items(&["a", "b", "c"]).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_items_stops_at_first_failure() {
        let mut store = MockStore::new();
        store
            .expect_remove_item()
            .with(eq("a"))
            .times(1)
            .returning(|_| {
                Err(crate::BridgeError::NotAvailable(
                    "storage disabled".to_string(),
                ))
            });

        assert!(store.remove_items(&["a", "b"]).await.is_err());
    }
}
