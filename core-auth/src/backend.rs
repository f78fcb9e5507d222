//! Session persistence backends.
//!
//! [`CredentialStore`](crate::CredentialStore) does not know where the bundle
//! lives. It talks to a [`StorageBackend`] chosen once from
//! [`StorageMode`] when the client is built:
//!
//! - [`LocalBackend`]: obfuscated bundle in the local key-value store
//! - [`CookieSyncedBackend`]: the local bundle plus a server-managed cookie
//!   mirror, which is consulted first on load
//!
//! Backends report failures as [`AuthError`]. Turning those into "no session"
//! is the store's job.

use async_trait::async_trait;
use bridge_traits::{HttpClient, HttpRequest, KeyValueStore};
use core_runtime::config::StorageMode;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{AuthError, Result};
use crate::obfuscation::Obfuscator;
use crate::types::SessionCredentials;

/// Slot holding the obfuscated session bundle.
pub const SESSION_SLOT: &str = "intransparency_auth";

pub const SET_COOKIE_PATH: &str = "/api/auth/set-cookie";
pub const GET_COOKIE_PATH: &str = "/api/auth/get-cookie";
pub const CLEAR_COOKIE_PATH: &str = "/api/auth/clear-cookie";

/// Where the session bundle is persisted.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Load the stored bundle.
    ///
    /// # Errors
    ///
    /// - [`AuthError::SecureStorageUnavailable`] if the store cannot be read
    /// - [`AuthError::SessionCorrupted`] if the bundle cannot be decoded
    async fn load(&self) -> Result<Option<SessionCredentials>>;

    /// Persist `session`, replacing any previous bundle.
    async fn save(&self, session: &SessionCredentials) -> Result<()>;

    /// Remove the bundle. Succeeds when nothing is stored.
    async fn clear(&self) -> Result<()>;

    fn mode(&self) -> StorageMode;
}

/// Obfuscated bundle in the local [`KeyValueStore`].
pub struct LocalBackend {
    store: Arc<dyn KeyValueStore>,
    obfuscator: Obfuscator,
}

impl LocalBackend {
    pub fn new(store: Arc<dyn KeyValueStore>, obfuscator: Obfuscator) -> Self {
        Self { store, obfuscator }
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    async fn load(&self) -> Result<Option<SessionCredentials>> {
        let raw = self.store.get_item(SESSION_SLOT).await.map_err(|e| {
            warn!(error = %e, "Failed to read session slot");
            AuthError::SecureStorageUnavailable(e.to_string())
        })?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        let Some(json) = self.obfuscator.decode(&raw) else {
            debug!("Session slot is empty");
            return Ok(None);
        };

        let session = serde_json::from_str(&json)
            .map_err(|e| AuthError::SessionCorrupted(format!("bundle did not parse: {}", e)))?;

        Ok(Some(session))
    }

    async fn save(&self, session: &SessionCredentials) -> Result<()> {
        let json =
            serde_json::to_string(session).map_err(|e| AuthError::SerializationFailed {
                context: "session bundle".to_string(),
                source: e,
            })?;

        self.store
            .set_item(SESSION_SLOT, &self.obfuscator.encode(&json))
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to write session slot");
                AuthError::SecureStorageUnavailable(e.to_string())
            })
    }

    async fn clear(&self) -> Result<()> {
        self.store.remove_item(SESSION_SLOT).await.map_err(|e| {
            warn!(error = %e, "Failed to remove session slot");
            AuthError::SecureStorageUnavailable(e.to_string())
        })
    }

    fn mode(&self) -> StorageMode {
        StorageMode::Local
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CookiePayload<'a> {
    access_token: &'a str,
    refresh_token: &'a str,
    expires_at: i64,
}

/// Local bundle mirrored to a server-managed cookie.
///
/// Writes go to the local slot first so that a request issued right after
/// `save` always sees the new token. The cookie calls are awaited but their
/// failures are only logged.
pub struct CookieSyncedBackend {
    local: LocalBackend,
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl CookieSyncedBackend {
    pub fn new(local: LocalBackend, http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            local,
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_cookie(&self) -> Option<SessionCredentials> {
        let response = match self.http.execute(HttpRequest::get(self.endpoint(GET_COOKIE_PATH))).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Failed to read session cookie");
                return None;
            }
        };

        if !response.is_success() {
            debug!(status = response.status, "No session cookie available");
            return None;
        }

        match response.json::<Option<SessionCredentials>>() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Session cookie payload did not parse");
                None
            }
        }
    }

    async fn post_best_effort(&self, path: &str, request: HttpRequest) {
        match self.http.execute(request).await {
            Ok(response) if response.is_success() => {
                debug!(path, "Session cookie synced");
            }
            Ok(response) => {
                warn!(path, status = response.status, "Session cookie sync rejected");
            }
            Err(e) => {
                warn!(path, error = %e, "Session cookie sync failed");
            }
        }
    }
}

#[async_trait]
impl StorageBackend for CookieSyncedBackend {
    async fn load(&self) -> Result<Option<SessionCredentials>> {
        if let Some(session) = self.read_cookie().await {
            return Ok(Some(session));
        }
        self.local.load().await
    }

    async fn save(&self, session: &SessionCredentials) -> Result<()> {
        self.local.save(session).await?;

        let payload = CookiePayload {
            access_token: &session.access_token,
            refresh_token: &session.refresh_token,
            expires_at: session.expires_at.timestamp_millis(),
        };
        match HttpRequest::post(self.endpoint(SET_COOKIE_PATH)).json(&payload) {
            Ok(request) => self.post_best_effort(SET_COOKIE_PATH, request).await,
            Err(e) => warn!(error = %e, "Failed to encode session cookie payload"),
        }

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let local = self.local.clear().await;
        self.post_best_effort(
            CLEAR_COOKIE_PATH,
            HttpRequest::post(self.endpoint(CLEAR_COOKIE_PATH)),
        )
        .await;
        local
    }

    fn mode(&self) -> StorageMode {
        StorageMode::CookieSynced
    }
}
