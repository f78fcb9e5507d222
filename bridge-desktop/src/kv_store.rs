//! Key-Value Slot Storage
//!
//! Desktop stand-ins for browser local storage: one JSON document on disk,
//! or a process-local map.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::KeyValueStore,
};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// Same order of magnitude as a browser origin's local storage allowance.
const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// File-backed key-value store
///
/// All slots live in a single JSON object at `path`. Every mutation rewrites
/// the document through a temporary sibling file followed by a rename, so a
/// crash never leaves a half-written document behind.
///
/// A document that fails to parse is logged and treated as empty; the next
/// successful write replaces it.
pub struct FileKeyValueStore {
    path: PathBuf,
    quota_bytes: usize,
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Create a store persisting to `path`
    ///
    /// The file and its parent directory are created lazily on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
            lock: Mutex::new(()),
        }
    }

    /// Override the maximum document size in bytes
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    /// Default location under the user data directory
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".local")
                    .join("share")
            })
            .join("intransparency")
            .join("storage.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(BridgeError::Io(e)),
        };

        match serde_json::from_slice(&raw) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Storage document is corrupted, starting empty");
                Ok(BTreeMap::new())
            }
        }
    }

    async fn persist(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let encoded = serde_json::to_vec_pretty(map).map_err(|e| {
            BridgeError::OperationFailed(format!("Failed to encode storage document: {}", e))
        })?;

        if encoded.len() > self.quota_bytes {
            return Err(BridgeError::QuotaExceeded(format!(
                "document would be {} bytes, quota is {}",
                encoded.len(),
                self.quota_bytes
            )));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, &encoded).await?;
        fs::rename(&tmp_path, &self.path).await?;

        debug!(path = ?self.path, slots = map.len(), "Persisted storage document");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.load().await?;
        map.insert(key.to_string(), value.to_string());
        self.persist(&map).await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.load().await?;
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&map).await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.into_keys().collect())
    }
}

/// In-memory key-value store
///
/// Cloning shares the underlying map, which lets tests inspect raw slot
/// contents after handing a clone to the code under test.
#[derive(Clone, Default)]
pub struct MemoryKeyValueStore {
    data: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.data
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.data.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.data.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
