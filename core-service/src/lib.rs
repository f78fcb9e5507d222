//! Core service façade and bootstrap helpers.
//!
//! This crate wires the host-provided bridges from a [`CoreConfig`] into the
//! session stack: one shared [`CredentialStore`], the [`AuthGateway`] that
//! every API call goes through, and the [`SessionManager`] for account
//! operations. Desktop apps typically enable the `desktop-shims` feature so
//! that [`bootstrap_from_env`] can fill in the reqwest client and the file
//! store.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use core_auth::{AuthGateway, CredentialStore, SessionManager};
use core_runtime::config::{CoreConfig, CoreConfigBuilder};
use core_runtime::events::{AuthEvent, CoreEvent, EventBus, EventStream};
use tracing::info;

/// Primary façade exposed to host applications.
///
/// Cloning is cheap and every clone shares the same store, gateway and
/// event bus.
#[derive(Clone)]
pub struct CoreService {
    config: Arc<CoreConfig>,
    event_bus: EventBus,
    store: Arc<CredentialStore>,
    gateway: Arc<AuthGateway>,
    sessions: Arc<SessionManager>,
}

impl CoreService {
    /// Build the session stack from `config`.
    ///
    /// Any session left in the legacy `token`/`user` slots is migrated before
    /// this returns.
    pub async fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let event_bus = EventBus::default();
        let store = Arc::new(CredentialStore::from_config(&config, event_bus.clone()));
        store.migrate_legacy().await;

        let gateway = Arc::new(AuthGateway::from_config(
            &config,
            store.clone(),
            event_bus.clone(),
        ));
        let sessions = Arc::new(SessionManager::new(gateway.clone(), event_bus.clone()));

        info!(
            api_base_url = %config.api_base_url,
            storage_mode = ?config.storage_mode,
            "Session client ready"
        );

        Ok(Self {
            config: Arc::new(config),
            event_bus,
            store,
            gateway,
            sessions,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<CredentialStore> {
        Arc::clone(&self.store)
    }

    /// Gateway for authenticated API calls.
    pub fn gateway(&self) -> Arc<AuthGateway> {
        Arc::clone(&self.gateway)
    }

    pub fn sessions(&self) -> Arc<SessionManager> {
        Arc::clone(&self.sessions)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Stream of every event emitted after this call.
    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
    }

    /// Stream of sign-in redirects. The host should navigate to the carried
    /// route whenever one arrives.
    pub fn sign_in_redirects(&self) -> EventStream {
        self.subscribe().filter(|event| {
            matches!(event, CoreEvent::Auth(AuthEvent::SignInRequired { .. }))
        })
    }
}

impl std::fmt::Debug for CoreService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreService")
            .field("config", &self.config)
            .field("event_bus", &self.event_bus)
            .finish_non_exhaustive()
    }
}

/// Build a [`CoreService`] from `INTRANSPARENCY_*` environment variables.
///
/// Without the `desktop-shims` feature this fails with a missing-capability
/// error, since no HTTP client or store can be supplied.
///
/// ```no_run
/// # async fn example() -> core_service::Result<()> {
/// let core = core_service::bootstrap_from_env().await?;
/// let mut redirects = core.sign_in_redirects();
/// # Ok(())
/// # }
/// ```
pub async fn bootstrap_from_env() -> Result<CoreService> {
    let config = CoreConfigBuilder::from_env()?.build()?;
    CoreService::new(config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_desktop::MemoryKeyValueStore;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{HttpClient, HttpRequest, HttpResponse, KeyValueStore};
    use core_runtime::config::StorageMode;
    use mockall::mock;

    mock! {
        Http {}

        #[async_trait]
        impl HttpClient for Http {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    fn config(http: MockHttp, slots: &MemoryKeyValueStore, mode: StorageMode) -> CoreConfig {
        CoreConfig::builder()
            .api_base_url("http://api.test")
            .storage_mode(mode)
            .http_client(Arc::new(http))
            .key_value_store(Arc::new(slots.clone()))
            .storage_path("unused.json")
            .build()
            .expect("valid config")
    }

    #[tokio::test]
    async fn test_new_migrates_legacy_session() {
        let slots = MemoryKeyValueStore::new();
        slots.set_item("token", "T-legacy").await.unwrap();
        slots
            .set_item("user", r#"{"id":"u1","email":"jane@example.com"}"#)
            .await
            .unwrap();

        let core = CoreService::new(config(MockHttp::new(), &slots, StorageMode::Local))
            .await
            .unwrap();

        assert_eq!(
            core.store().get_access_token().await.as_deref(),
            Some("T-legacy")
        );
        assert!(slots.get_item("token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_storage_mode_selects_backend() {
        let slots = MemoryKeyValueStore::new();
        let mut http = MockHttp::new();
        http.expect_execute()
            .returning(|_| Ok(HttpResponse::new(404, "")));

        let core = CoreService::new(config(http, &slots, StorageMode::CookieSynced))
            .await
            .unwrap();

        assert_eq!(core.store().storage_mode(), StorageMode::CookieSynced);
        assert!(core.config().is_hardened());
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let slots = MemoryKeyValueStore::new();
        let mut config = config(MockHttp::new(), &slots, StorageMode::Local);
        config.sign_in_route = "auth/login".to_string();

        let result = CoreService::new(config).await;
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[tokio::test]
    async fn test_sign_in_redirect_reaches_host() {
        let slots = MemoryKeyValueStore::new();
        let mut http = MockHttp::new();
        http.expect_execute()
            .returning(|_| Ok(HttpResponse::new(401, r#"{"error":"Invalid token"}"#)));

        let core = CoreService::new(config(http, &slots, StorageMode::Local))
            .await
            .unwrap();
        let mut redirects = core.sign_in_redirects();

        let request = HttpRequest::get(core.config().endpoint("/api/jobs"));
        let result = core.gateway().execute(request).await;

        assert!(matches!(
            result,
            Err(core_auth::GatewayError::Unauthorized { .. })
        ));
        match redirects.recv().await {
            Ok(CoreEvent::Auth(AuthEvent::SignInRequired { redirect_to })) => {
                assert_eq!(redirect_to, "/auth/login")
            }
            other => panic!("expected sign-in redirect, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let slots = MemoryKeyValueStore::new();
        let core = CoreService::new(config(MockHttp::new(), &slots, StorageMode::Local))
            .await
            .unwrap();
        let clone = core.clone();

        clone
            .store()
            .update_user_summary(&core_auth::UserSummary {
                id: "u1".to_string(),
                email: "jane@example.com".to_string(),
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                role: core_auth::UserRole::Student,
            })
            .await;

        assert!(core.store().get_user_summary().await.is_some());
        assert!(Arc::ptr_eq(&core.gateway(), &clone.gateway()));
    }
}
