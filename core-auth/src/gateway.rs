//! # Authenticated Request Gateway
//!
//! Wraps an [`HttpClient`] so that every outbound call carries the current
//! bearer token and recovers once from an expired token.
//!
//! ## Protocol
//!
//! Each call moves through [`RequestState`]:
//!
//! ```text
//! Pending -> Sent -> Ok
//!                 -> Unauthorized -> Refreshing -> RetriedOk
//!                                               -> RefreshFailed -> LoggedOut
//! ```
//!
//! - Before sending, `Authorization: Bearer <token>` is attached when the
//!   store holds an access token.
//! - On `401` the refresh token is exchanged at `POST /api/auth/refresh`,
//!   the new session is persisted, and the original request is resent once
//!   with the new token. Whatever the retry returns is handed back as-is.
//! - If there is no refresh token, or the exchange fails, the session is
//!   cleared, [`AuthEvent::SignInRequired`] is emitted and the call fails
//!   with [`GatewayError::Unauthorized`].
//! - Every other status passes through as `Ok(HttpResponse)`.
//!
//! Concurrent calls that hit `401` each refresh on their own.

use bridge_traits::{Clock, HttpClient, HttpMethod, HttpRequest, HttpResponse};
use chrono::Duration;
use core_runtime::config::CoreConfig;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus, SessionClearReason};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::credential_store::CredentialStore;
use crate::error::{AuthError, GatewayError};
use crate::types::SessionCredentials;

pub const REFRESH_PATH: &str = "/api/auth/refresh";

/// Longest error body carried in [`GatewayError::Status`].
const ERROR_BODY_LIMIT: usize = 500;

type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Settings the gateway reads from [`CoreConfig`].
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub api_base_url: String,
    /// Route handed to the host when the session cannot be recovered
    pub sign_in_route: String,
    /// Lifetime assigned to refreshed access tokens
    pub token_ttl: Duration,
}

impl GatewaySettings {
    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            api_base_url: config.api_base_url.clone(),
            sign_in_route: config.sign_in_route.clone(),
            token_ttl: config.token_ttl,
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
    }
}

/// Lifecycle of one outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Pending,
    Sent,
    Ok,
    Unauthorized,
    Refreshing,
    RetriedOk,
    RefreshFailed,
    LoggedOut,
}

/// One call in flight, with its one-shot retry flag.
#[derive(Debug)]
pub struct InFlightRequest {
    request: HttpRequest,
    state: RequestState,
    retried: bool,
}

impl InFlightRequest {
    pub fn new(request: HttpRequest) -> Self {
        Self {
            request,
            state: RequestState::Pending,
            retried: false,
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn has_retried(&self) -> bool {
        self.retried
    }

    fn transition(&mut self, next: RequestState) {
        debug!(
            method = %self.request.method,
            url = %self.request.url,
            from = ?self.state,
            to = ?next,
            "Request state changed"
        );
        self.state = next;
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// The backend route answers `{token}`; newer deployments answer
/// `{accessToken, refreshToken}`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    #[serde(alias = "token")]
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// HTTP entry point for authenticated API calls.
pub struct AuthGateway {
    http: Arc<dyn HttpClient>,
    store: Arc<CredentialStore>,
    clock: Arc<dyn Clock>,
    event_bus: EventBus,
    settings: GatewaySettings,
}

impl AuthGateway {
    pub fn new(
        http: Arc<dyn HttpClient>,
        store: Arc<CredentialStore>,
        clock: Arc<dyn Clock>,
        event_bus: EventBus,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            http,
            store,
            clock,
            event_bus,
            settings,
        }
    }

    pub fn from_config(config: &CoreConfig, store: Arc<CredentialStore>, event_bus: EventBus) -> Self {
        Self::new(
            config.http_client.clone(),
            store,
            config.clock.clone(),
            event_bus,
            GatewaySettings::from_config(config),
        )
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Absolute URL for an API path such as `/api/auth/me`.
    pub fn endpoint(&self, path: &str) -> String {
        self.settings.endpoint(path)
    }

    /// Build a request for `path` with a JSON body.
    pub fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> GatewayResult<HttpRequest> {
        HttpRequest::new(method, self.endpoint(path))
            .json(body)
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))
    }

    /// Send `request` with the current bearer token, refreshing once on 401.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Transport`] if no response was received
    /// - [`GatewayError::Unauthorized`] if the session could not be
    ///   recovered (it has been cleared)
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn execute(&self, request: HttpRequest) -> GatewayResult<HttpResponse> {
        let mut call = InFlightRequest::new(request);
        self.run(&mut call).await
    }

    /// Like [`execute`](Self::execute), then decode a 2xx JSON body into `T`.
    ///
    /// Non-2xx responses become [`GatewayError::Status`].
    pub async fn send_json<T: DeserializeOwned>(&self, request: HttpRequest) -> GatewayResult<T> {
        let response = self.execute(request).await?;

        if !response.is_success() {
            return Err(GatewayError::Status {
                status: response.status,
                body: truncate_body(&String::from_utf8_lossy(&response.body)),
            });
        }

        response
            .json()
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }

    /// Send without any bearer token and without the refresh protocol.
    pub async fn execute_anonymous(&self, request: HttpRequest) -> GatewayResult<HttpResponse> {
        let response = self.http.execute(request.with_authorization(None)).await?;
        Ok(response)
    }

    /// Send with the current bearer token but never refresh.
    pub async fn execute_without_refresh(&self, request: HttpRequest) -> GatewayResult<HttpResponse> {
        let token = self.store.get_access_token().await;
        let response = self
            .http
            .execute(request.with_authorization(token.as_deref()))
            .await?;
        Ok(response)
    }

    async fn run(&self, call: &mut InFlightRequest) -> GatewayResult<HttpResponse> {
        let token = self.store.get_access_token().await;
        call.request = call.request.clone().with_authorization(token.as_deref());

        call.transition(RequestState::Sent);
        let response = self.http.execute(call.request.clone()).await?;

        if !response.is_unauthorized() {
            call.transition(RequestState::Ok);
            return Ok(response);
        }

        call.transition(RequestState::Unauthorized);
        if call.retried {
            return Ok(response);
        }

        let Some(refresh_token) = self.store.get_refresh_token().await else {
            info!("Received 401 without a refresh token");
            return Err(self.force_sign_in(call, &response).await);
        };

        call.transition(RequestState::Refreshing);
        let new_token = match self.refresh(&refresh_token, token.as_deref()).await {
            Ok(new_token) => new_token,
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                return Err(self.force_sign_in(call, &response).await);
            }
        };

        call.retried = true;
        call.request = call.request.clone().with_authorization(Some(&new_token));
        let retried = self.http.execute(call.request.clone()).await?;
        call.transition(RequestState::RetriedOk);

        if retried.is_unauthorized() {
            warn!("Request still unauthorized after token refresh");
        }
        Ok(retried)
    }

    /// Exchange `refresh_token` for a new session and persist it.
    ///
    /// Returns the new access token.
    async fn refresh(&self, refresh_token: &str, current: Option<&str>) -> Result<String, AuthError> {
        let _ = self
            .event_bus
            .emit(CoreEvent::Auth(AuthEvent::TokenRefreshing));

        // The refresh route sits behind the bearer check as well
        let request = HttpRequest::post(self.endpoint(REFRESH_PATH))
            .json(&RefreshRequest { refresh_token })
            .map_err(|e| AuthError::TokenRefreshFailed(e.to_string()))?
            .with_authorization(current);

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| AuthError::TokenRefreshFailed(e.to_string()))?;

        if !response.is_success() {
            return Err(AuthError::TokenRefreshFailed(format!(
                "refresh endpoint returned {}",
                response.status
            )));
        }

        let body: RefreshResponse = response
            .json()
            .map_err(|e| AuthError::TokenRefreshFailed(e.to_string()))?;

        if body.access_token.is_empty() {
            return Err(AuthError::TokenRefreshFailed(
                "refresh endpoint returned an empty token".to_string(),
            ));
        }

        let user = match self.store.get_session().await.and_then(|s| s.user) {
            Some(user) => Some(user),
            None => self.store.get_user_summary().await,
        };

        let expires_at = SessionCredentials::expiry_after(self.clock.now(), self.settings.token_ttl)
            .ok_or_else(|| {
                AuthError::TokenRefreshFailed("token lifetime is out of range".to_string())
            })?;
        let session = SessionCredentials::new(
            body.access_token,
            body
                .refresh_token
                .filter(|token| !token.is_empty())
                .unwrap_or_else(|| refresh_token.to_string()),
            user,
            expires_at,
        );
        self.store.set_session(&session).await;

        info!(expires_at = %session.expires_at, "Access token refreshed");
        let _ = self
            .event_bus
            .emit(CoreEvent::Auth(AuthEvent::TokenRefreshed {
                expires_at: session.expires_at,
            }));

        Ok(session.access_token)
    }

    async fn force_sign_in(&self, call: &mut InFlightRequest, response: &HttpResponse) -> GatewayError {
        call.transition(RequestState::RefreshFailed);
        self.store
            .clear_with_reason(SessionClearReason::RefreshFailed)
            .await;
        call.transition(RequestState::LoggedOut);

        let _ = self
            .event_bus
            .emit(CoreEvent::Auth(AuthEvent::SignInRequired {
                redirect_to: self.settings.sign_in_route.clone(),
            }));

        GatewayError::Unauthorized {
            body: String::from_utf8_lossy(&response.body).into_owned(),
        }
    }
}

impl std::fmt::Debug for AuthGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGateway")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() <= ERROR_BODY_LIMIT {
        return body.to_string();
    }
    let mut end = ERROR_BODY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;
    use crate::obfuscation::Obfuscator;
    use crate::test_support::{sample_user, session_at, ManualClock, ScriptedHttpClient, BASE};
    use bridge_desktop::MemoryKeyValueStore;
    use core_runtime::events::EventStream;
    use serde_json::Value;

    const PROFILE: &str = "GET /api/profile";
    const REFRESH: &str = "POST /api/auth/refresh";

    struct Fixture {
        gateway: AuthGateway,
        store: Arc<CredentialStore>,
        http: ScriptedHttpClient,
        clock: ManualClock,
        events: EventStream,
    }

    fn fixture() -> Fixture {
        fixture_with_ttl(Duration::days(7))
    }

    fn fixture_with_ttl(token_ttl: Duration) -> Fixture {
        let slots = Arc::new(MemoryKeyValueStore::new());
        let clock = ManualClock::new();
        let http = ScriptedHttpClient::new();
        let event_bus = EventBus::new(64);
        let events = EventStream::new(event_bus.subscribe());

        let store = Arc::new(CredentialStore::new(
            Arc::new(LocalBackend::new(slots.clone(), Obfuscator::new("k"))),
            slots,
            Arc::new(clock.clone()),
            event_bus.clone(),
        ));
        let gateway = AuthGateway::new(
            Arc::new(http.clone()),
            store.clone(),
            Arc::new(clock.clone()),
            event_bus,
            GatewaySettings {
                api_base_url: BASE.to_string(),
                sign_in_route: "/auth/login".to_string(),
                token_ttl,
            },
        );

        Fixture {
            gateway,
            store,
            http,
            clock,
            events,
        }
    }

    impl Fixture {
        async fn signed_in(self, refresh_token: &str) -> Self {
            self.store
                .set_session(&session_at(&self.clock, "A1", refresh_token, Duration::hours(1)))
                .await;
            self
        }

        fn profile(&self) -> HttpRequest {
            HttpRequest::get(self.gateway.endpoint("/api/profile"))
        }

        fn auth_events(&mut self) -> Vec<AuthEvent> {
            let mut events = Vec::new();
            while let Some(Ok(CoreEvent::Auth(event))) = self.events.try_recv() {
                events.push(event);
            }
            events
        }
    }

    fn bearer(request: &HttpRequest) -> Option<&str> {
        request.header_value("Authorization")
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let fx = fixture().signed_in("R1").await;
        fx.http.reply(PROFILE, 200, r#"{"ok":true}"#);

        let response = fx.gateway.execute(fx.profile()).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(bearer(&fx.http.requests()[0]), Some("Bearer A1"));
    }

    #[tokio::test]
    async fn test_sends_unauthenticated_without_session() {
        let fx = fixture();
        fx.http.reply(PROFILE, 200, "{}");

        fx.gateway.execute(fx.profile()).await.unwrap();

        assert!(bearer(&fx.http.requests()[0]).is_none());
    }

    #[tokio::test]
    async fn test_other_statuses_pass_through() {
        let fx = fixture().signed_in("R1").await;
        fx.http.reply(PROFILE, 500, "boom").reply(PROFILE, 403, "nope");

        assert_eq!(fx.gateway.execute(fx.profile()).await.unwrap().status, 500);
        assert_eq!(fx.gateway.execute(fx.profile()).await.unwrap().status, 403);
        assert_eq!(fx.http.calls_to(REFRESH), 0);
        assert!(fx.store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_transport_error_keeps_session() {
        let fx = fixture().signed_in("R1").await;
        fx.http.fail(PROFILE);

        let result = fx.gateway.execute(fx.profile()).await;

        assert!(matches!(result, Err(GatewayError::Transport(_))));
        assert!(fx.store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_refresh_then_retry_once() {
        let mut fx = fixture().signed_in("R1").await;
        fx.http
            .reply(PROFILE, 401, r#"{"error":"Invalid token"}"#)
            .reply(REFRESH, 200, r#"{"accessToken":"A2","refreshToken":"R2"}"#)
            .reply(PROFILE, 200, r#"{"name":"Jane"}"#);

        let mut call = InFlightRequest::new(fx.profile());
        let response = fx.gateway.run(&mut call).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(call.state(), RequestState::RetriedOk);
        assert!(call.has_retried());
        assert_eq!(fx.http.calls_to(REFRESH), 1);

        let profile_calls = fx.http.requests_to(PROFILE);
        assert_eq!(profile_calls.len(), 2);
        assert_eq!(bearer(&profile_calls[1]), Some("Bearer A2"));

        let session = fx.store.get_session().await.unwrap();
        assert_eq!(session.access_token, "A2");
        assert_eq!(session.refresh_token, "R2");
        assert_eq!(session.user, Some(sample_user()));
        assert_eq!(session.expires_at, fx.clock.now() + Duration::days(7));

        let events = fx.auth_events();
        assert!(events.contains(&AuthEvent::TokenRefreshing));
        assert!(events.contains(&AuthEvent::TokenRefreshed {
            expires_at: session.expires_at
        }));
    }

    #[tokio::test]
    async fn test_refresh_request_shape() {
        let fx = fixture().signed_in("R1").await;
        fx.http
            .reply(PROFILE, 401, "")
            .reply(REFRESH, 200, r#"{"token":"A2"}"#)
            .reply(PROFILE, 200, "{}");

        fx.gateway.execute(fx.profile()).await.unwrap();

        let refresh = &fx.http.requests_to(REFRESH)[0];
        let body: Value = serde_json::from_slice(refresh.body.as_ref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "refreshToken": "R1" }));
        assert_eq!(bearer(refresh), Some("Bearer A1"));
    }

    #[tokio::test]
    async fn test_token_alias_keeps_previous_refresh_token() {
        let fx = fixture().signed_in("R1").await;
        fx.http
            .reply(PROFILE, 401, "")
            .reply(REFRESH, 200, r#"{"token":"A2"}"#)
            .reply(PROFILE, 200, "{}");

        fx.gateway.execute(fx.profile()).await.unwrap();

        let session = fx.store.get_session().await.unwrap();
        assert_eq!(session.access_token, "A2");
        assert_eq!(session.refresh_token, "R1");
    }

    #[tokio::test]
    async fn test_second_401_is_returned_without_second_refresh() {
        let fx = fixture().signed_in("R1").await;
        fx.http
            .reply(PROFILE, 401, "")
            .reply(REFRESH, 200, r#"{"accessToken":"A2","refreshToken":"R2"}"#)
            .reply(PROFILE, 401, r#"{"error":"still no"}"#);

        let response = fx.gateway.execute(fx.profile()).await.unwrap();

        assert_eq!(response.status, 401);
        assert_eq!(fx.http.calls_to(REFRESH), 1);
        assert_eq!(fx.http.calls_to(PROFILE), 2);
        assert_eq!(fx.store.get_access_token().await.as_deref(), Some("A2"));
    }

    #[tokio::test]
    async fn test_401_without_refresh_token_logs_out() {
        let mut fx = fixture().signed_in("").await;
        fx.http.reply(PROFILE, 401, r#"{"error":"Invalid token"}"#);

        let mut call = InFlightRequest::new(fx.profile());
        let result = fx.gateway.run(&mut call).await;

        match result {
            Err(GatewayError::Unauthorized { body }) => assert!(body.contains("Invalid token")),
            other => panic!("expected Unauthorized, got {:?}", other),
        }
        assert_eq!(call.state(), RequestState::LoggedOut);
        assert_eq!(fx.http.calls_to(REFRESH), 0);
        assert!(fx.store.get_session().await.is_none());
        assert!(fx.store.get_user_summary().await.is_none());

        let events = fx.auth_events();
        assert!(events.contains(&AuthEvent::SessionCleared {
            reason: SessionClearReason::RefreshFailed
        }));
        assert!(events.contains(&AuthEvent::SignInRequired {
            redirect_to: "/auth/login".to_string()
        }));
    }

    #[tokio::test]
    async fn test_rejected_refresh_logs_out() {
        let mut fx = fixture().signed_in("R1").await;
        fx.http
            .reply(PROFILE, 401, "expired")
            .reply(REFRESH, 403, r#"{"error":"Invalid token"}"#);

        let result = fx.gateway.execute(fx.profile()).await;

        assert!(matches!(result, Err(GatewayError::Unauthorized { ref body }) if body == "expired"));
        assert_eq!(fx.http.calls_to(PROFILE), 1);
        assert!(!fx.store.is_authenticated().await);
        assert!(fx
            .auth_events()
            .iter()
            .any(|e| matches!(e, AuthEvent::SignInRequired { .. })));
    }

    #[tokio::test]
    async fn test_unrepresentable_token_lifetime_fails_refresh() {
        let fx = fixture_with_ttl(Duration::MAX).signed_in("R1").await;
        fx.http
            .reply(PROFILE, 401, "expired")
            .reply(REFRESH, 200, r#"{"accessToken":"A2"}"#);

        let result = fx.gateway.execute(fx.profile()).await;

        assert!(matches!(result, Err(GatewayError::Unauthorized { .. })));
        assert_eq!(fx.http.calls_to(REFRESH), 1);
        assert_eq!(fx.http.calls_to(PROFILE), 1);
        assert!(!fx.store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_refresh_transport_failure_logs_out() {
        let fx = fixture().signed_in("R1").await;
        fx.http.reply(PROFILE, 401, "").fail(REFRESH);

        let result = fx.gateway.execute(fx.profile()).await;

        assert!(matches!(result, Err(GatewayError::Unauthorized { .. })));
        assert!(fx.store.get_session().await.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_refresh_body_logs_out() {
        let fx = fixture().signed_in("R1").await;
        fx.http
            .reply(PROFILE, 401, "")
            .reply(REFRESH, 200, "<html>")
            .reply(PROFILE, 401, "")
            .reply(REFRESH, 200, r#"{"accessToken":""}"#);

        assert!(fx.gateway.execute(fx.profile()).await.is_err());

        fx.store
            .set_session(&session_at(&fx.clock, "A1", "R1", Duration::hours(1)))
            .await;
        assert!(fx.gateway.execute(fx.profile()).await.is_err());
        assert!(!fx.store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_send_json_decodes_success() {
        let fx = fixture().signed_in("R1").await;
        fx.http.reply(PROFILE, 200, r#"{"name":"Jane"}"#);

        let body: Value = fx.gateway.send_json(fx.profile()).await.unwrap();
        assert_eq!(body["name"], "Jane");
    }

    #[tokio::test]
    async fn test_send_json_maps_error_status() {
        let fx = fixture().signed_in("R1").await;
        let long_body = "é".repeat(400);
        fx.http.reply(PROFILE, 404, &long_body).reply(PROFILE, 200, "not json");

        match fx.gateway.send_json::<Value>(fx.profile()).await {
            Err(GatewayError::Status { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body.len(), 500);
            }
            other => panic!("expected Status, got {:?}", other),
        }

        assert!(matches!(
            fx.gateway.send_json::<Value>(fx.profile()).await,
            Err(GatewayError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_execute_anonymous_strips_token_and_never_refreshes() {
        let fx = fixture().signed_in("R1").await;
        fx.http.reply(PROFILE, 401, "");

        let request = fx.profile().bearer_token("stale");
        let response = fx.gateway.execute_anonymous(request).await.unwrap();

        assert_eq!(response.status, 401);
        assert!(bearer(&fx.http.requests()[0]).is_none());
        assert_eq!(fx.http.calls_to(REFRESH), 0);
        assert!(fx.store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_execute_without_refresh_attaches_token() {
        let fx = fixture().signed_in("R1").await;
        fx.http.reply(PROFILE, 401, "");

        let response = fx.gateway.execute_without_refresh(fx.profile()).await.unwrap();

        assert_eq!(response.status, 401);
        assert_eq!(bearer(&fx.http.requests()[0]), Some("Bearer A1"));
        assert_eq!(fx.http.calls_to(REFRESH), 0);
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        assert_eq!(truncate_body("short"), "short");
        let body = "é".repeat(300);
        let truncated = truncate_body(&body);
        assert_eq!(truncated.len(), 500);
        assert!(body.starts_with(&truncated));

        let odd = format!("a{}", "é".repeat(300));
        assert_eq!(truncate_body(&odd).len(), 499);
    }

    #[test]
    fn test_settings_endpoint() {
        let settings = GatewaySettings {
            api_base_url: "https://api.example.com/".to_string(),
            sign_in_route: "/auth/login".to_string(),
            token_ttl: Duration::days(7),
        };
        assert_eq!(
            settings.endpoint("/api/auth/me"),
            "https://api.example.com/api/auth/me"
        );
    }
}
