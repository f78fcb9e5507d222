//! # Credential Store
//!
//! Durable home of the current [`SessionCredentials`] and a plaintext
//! [`UserSummary`] mirror.
//!
//! ## Overview
//!
//! The store sits on top of a [`StorageBackend`] (where the obfuscated bundle
//! lives) and a raw [`KeyValueStore`] (for the mirror and legacy slots). None
//! of its public operations return errors: storage failures are logged and
//! reads degrade to "no session". This mirrors how a browser treats
//! unavailable local storage.
//!
//! ## Slots
//!
//! | Slot | Contents |
//! |------|----------|
//! | `intransparency_auth` | obfuscated JSON bundle (via the backend) |
//! | `user_info` | plaintext JSON `UserSummary` |
//! | `token`, `user` | pre-obfuscation layout, read once by [`CredentialStore::migrate_legacy`] |
//!
//! ## Usage
//!
//! ```no_run
//! use core_auth::{CredentialStore, LocalBackend, Obfuscator};
//! use bridge_desktop::MemoryKeyValueStore;
//! use bridge_traits::SystemClock;
//! use core_runtime::EventBus;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let slots = Arc::new(MemoryKeyValueStore::new());
//! let backend = Arc::new(LocalBackend::new(slots.clone(), Obfuscator::new("key")));
//! let store = CredentialStore::new(backend, slots, Arc::new(SystemClock), EventBus::default());
//!
//! store.migrate_legacy().await;
//! if let Some(token) = store.get_access_token().await {
//!     // attach token
//! }
//! # }
//! ```

use bridge_traits::{Clock, KeyValueStore};
use chrono::Duration;
use core_runtime::config::{CoreConfig, StorageMode};
use core_runtime::events::{AuthEvent, CoreEvent, EventBus, SessionClearReason};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::backend::{CookieSyncedBackend, LocalBackend, StorageBackend};
use crate::error::{AuthError, Result};
use crate::obfuscation::Obfuscator;
use crate::types::{SessionCredentials, UserSummary};

/// Slot holding the plaintext user summary.
pub const USER_SLOT: &str = "user_info";
pub const LEGACY_TOKEN_SLOT: &str = "token";
pub const LEGACY_USER_SLOT: &str = "user";

/// Lifetime given to a session rebuilt from the legacy slots.
pub const LEGACY_SESSION_TTL_HOURS: i64 = 24;

/// Owner of the persisted session. Share it with `Arc`.
pub struct CredentialStore {
    backend: Arc<dyn StorageBackend>,
    slots: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    event_bus: EventBus,
}

impl CredentialStore {
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        slots: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            backend,
            slots,
            clock,
            event_bus,
        }
    }

    /// Build a store whose backend follows `config.storage_mode`.
    pub fn from_config(config: &CoreConfig, event_bus: EventBus) -> Self {
        let local = LocalBackend::new(
            config.key_value_store.clone(),
            Obfuscator::new(&config.obfuscation_key),
        );

        let backend: Arc<dyn StorageBackend> = match config.storage_mode {
            StorageMode::Local => Arc::new(local),
            StorageMode::CookieSynced => Arc::new(CookieSyncedBackend::new(
                local,
                config.http_client.clone(),
                config.api_base_url.clone(),
            )),
        };

        Self::new(
            backend,
            config.key_value_store.clone(),
            config.clock.clone(),
            event_bus,
        )
    }

    pub fn storage_mode(&self) -> StorageMode {
        self.backend.mode()
    }

    /// Persist `session`, replacing whatever was stored.
    ///
    /// The user mirror is rewritten from the session's user, or removed when
    /// the session has none.
    /// Failures are logged and otherwise ignored.
    #[instrument(skip(self, session))]
    pub async fn set_session(&self, session: &SessionCredentials) {
        if let Err(e) = self.persist(session).await {
            warn!(error = %e, "Failed to store session");
        }
    }

    /// Current session, or `None` when absent, expired or unreadable.
    ///
    /// An expired or corrupted bundle is cleared as a side effect.
    #[instrument(skip(self))]
    pub async fn get_session(&self) -> Option<SessionCredentials> {
        let mut session = match self.backend.load().await {
            Ok(Some(session)) => session,
            Ok(None) => return None,
            Err(AuthError::SessionCorrupted(reason)) => {
                warn!(reason = %reason, "Stored session is corrupted, clearing it");
                self.clear_with_reason(SessionClearReason::Corrupted).await;
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Failed to load session");
                return None;
            }
        };

        if session.is_expired_at(self.clock.now()) {
            info!(expires_at = %session.expires_at, "Stored session expired");
            self.clear_with_reason(SessionClearReason::Expired).await;
            return None;
        }

        // The cookie mirror never carries the user
        if session.user.is_none() {
            session.user = self.get_user_summary().await;
        }

        Some(session)
    }

    pub async fn get_access_token(&self) -> Option<String> {
        self.get_session()
            .await
            .map(|session| session.access_token)
            .filter(|token| !token.is_empty())
    }

    pub async fn get_refresh_token(&self) -> Option<String> {
        self.get_session()
            .await
            .filter(SessionCredentials::has_refresh_token)
            .map(|session| session.refresh_token)
    }

    /// Read the user mirror without touching the session bundle.
    pub async fn get_user_summary(&self) -> Option<UserSummary> {
        let raw = match self.slots.get_item(USER_SLOT).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read user mirror");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "User mirror did not parse");
                None
            }
        }
    }

    /// Remove the session, the mirror and any legacy slots. Idempotent.
    pub async fn clear_session(&self) {
        self.clear_with_reason(SessionClearReason::Requested).await;
    }

    #[instrument(skip(self))]
    pub(crate) async fn clear_with_reason(&self, reason: SessionClearReason) {
        if let Err(e) = self.backend.clear().await {
            warn!(error = %e, "Failed to clear session bundle");
        }

        for slot in [USER_SLOT, LEGACY_TOKEN_SLOT, LEGACY_USER_SLOT] {
            if let Err(e) = self.slots.remove_item(slot).await {
                warn!(slot, error = %e, "Failed to remove slot");
            }
        }

        debug!(%reason, "Session cleared");
        let _ = self
            .event_bus
            .emit(CoreEvent::Auth(AuthEvent::SessionCleared { reason }));
    }

    /// Replace the user inside the current session (if any) and always
    /// rewrite the mirror.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn update_user_summary(&self, user: &UserSummary) {
        if let Some(mut session) = self.get_session().await {
            session.user = Some(user.clone());
            self.set_session(&session).await;
        }

        if let Err(e) = self.write_mirror(user).await {
            warn!(error = %e, "Failed to update user mirror");
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.get_access_token().await.is_some()
    }

    /// Move a session stored under the raw `token`/`user` slots into the
    /// obfuscated bundle.
    ///
    /// Runs only when both legacy slots are present. The migrated session has
    /// no refresh token and expires 24 hours from now. The legacy slots are
    /// removed only after the new bundle was written, so a failed migration
    /// is retried on the next start.
    ///
    /// Returns `true` if a session was migrated.
    #[instrument(skip(self))]
    pub async fn migrate_legacy(&self) -> bool {
        let (token, user) = match self.read_legacy_slots().await {
            Ok(Some(slots)) => slots,
            Ok(None) => return false,
            Err(e) => {
                warn!(error = %e, "Failed to read legacy session slots");
                return false;
            }
        };

        let user: UserSummary = match serde_json::from_str(&user) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Legacy user slot did not parse, leaving it in place");
                return false;
            }
        };

        let Some(expires_at) = SessionCredentials::expiry_after(
            self.clock.now(),
            Duration::hours(LEGACY_SESSION_TTL_HOURS),
        ) else {
            warn!("Clock is out of range, skipping legacy migration");
            return false;
        };
        let session = SessionCredentials::new(token, String::new(), Some(user), expires_at);

        if let Err(e) = self.persist(&session).await {
            warn!(error = %e, "Failed to persist migrated session");
            return false;
        }

        if let Err(e) = self
            .slots
            .remove_items(&[LEGACY_TOKEN_SLOT, LEGACY_USER_SLOT])
            .await
        {
            warn!(error = %e, "Failed to remove legacy session slots");
        }

        info!("Migrated legacy session storage");
        let _ = self
            .event_bus
            .emit(CoreEvent::Auth(AuthEvent::LegacySessionMigrated));
        true
    }

    async fn read_legacy_slots(&self) -> Result<Option<(String, String)>> {
        let token = self
            .slots
            .get_item(LEGACY_TOKEN_SLOT)
            .await
            .map_err(|e| AuthError::SecureStorageUnavailable(e.to_string()))?;
        let user = self
            .slots
            .get_item(LEGACY_USER_SLOT)
            .await
            .map_err(|e| AuthError::SecureStorageUnavailable(e.to_string()))?;

        Ok(match (token, user) {
            (Some(token), Some(user)) if !token.is_empty() && !user.is_empty() => {
                Some((token, user))
            }
            _ => None,
        })
    }

    async fn persist(&self, session: &SessionCredentials) -> Result<()> {
        self.backend.save(session).await?;

        // The mirror always describes the stored bundle
        match &session.user {
            Some(user) => {
                if let Err(e) = self.write_mirror(user).await {
                    warn!(error = %e, "Session stored but user mirror write failed");
                }
            }
            None => {
                if let Err(e) = self.slots.remove_item(USER_SLOT).await {
                    warn!(error = %e, "Session stored but stale user mirror remains");
                }
            }
        }

        let _ = self
            .event_bus
            .emit(CoreEvent::Auth(AuthEvent::SessionStored));
        Ok(())
    }

    async fn write_mirror(&self, user: &UserSummary) -> Result<()> {
        let json = serde_json::to_string(user).map_err(|e| AuthError::SerializationFailed {
            context: "user mirror".to_string(),
            source: e,
        })?;

        self.slots
            .set_item(USER_SLOT, &json)
            .await
            .map_err(|e| AuthError::SecureStorageUnavailable(e.to_string()))
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("storage_mode", &self.backend.mode())
            .finish_non_exhaustive()
    }
}
