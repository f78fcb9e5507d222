//! # Session Manager
//!
//! Account operations on top of the gateway and credential store.
//!
//! ## Overview
//!
//! `SessionManager` signs users in and out against the backend's
//! `/api/auth/*` routes and keeps the credential store in step:
//!
//! - `login` / `register` store a fresh session and emit
//!   [`AuthEvent::SignedIn`]
//! - `current_user` re-fetches the profile and refreshes the user mirror
//! - `logout` notifies the server best-effort, then clears local state
//!
//! ## Usage
//!
//! ```no_run
//! use core_auth::{SessionManager, UserRole};
//!
//! # async fn example(sessions: SessionManager) -> core_auth::Result<()> {
//! let user = sessions.login("jane@example.com", "correct horse").await?;
//! println!("Welcome back, {}", user.first_name);
//!
//! if sessions.has_role(&[UserRole::Recruiter]).await {
//!     // show recruiter dashboard
//! }
//!
//! sessions.logout().await;
//! # Ok(())
//! # }
//! ```

use bridge_traits::{HttpMethod, HttpRequest};
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use core_runtime::logging::redact_if_sensitive;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::credential_store::CredentialStore;
use crate::error::{AuthError, GatewayError, Result};
use crate::gateway::AuthGateway;
use crate::types::{AuthState, LoginRequest, RegisterRequest, SessionCredentials, UserRole, UserSummary};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const ME_PATH: &str = "/api/auth/me";
pub const LOGOUT_PATH: &str = "/api/auth/logout";

/// Body of a successful login or registration.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    #[serde(alias = "token")]
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    user: UserSummary,
}

#[derive(Deserialize)]
struct MeResponse {
    user: UserSummary,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Sign-in, sign-out and profile operations.
pub struct SessionManager {
    gateway: Arc<AuthGateway>,
    store: Arc<CredentialStore>,
    event_bus: EventBus,
}

impl SessionManager {
    pub fn new(gateway: Arc<AuthGateway>, event_bus: EventBus) -> Self {
        let store = gateway.store().clone();
        Self {
            gateway,
            store,
            event_bus,
        }
    }

    pub fn gateway(&self) -> &Arc<AuthGateway> {
        &self.gateway
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// - [`AuthError::AuthenticationFailed`] with the server's `error` text
    ///   when the credentials are rejected
    /// - [`AuthError::Gateway`] if the server could not be reached or
    ///   answered with an unreadable body
    #[instrument(skip(self, email, password), fields(email = %redact_if_sensitive("email", email)))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserSummary> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let request = self
            .gateway
            .json_request(HttpMethod::Post, LOGIN_PATH, &body)?;
        self.authenticate(request).await
    }

    /// Create an account and sign in as it.
    #[instrument(skip(self, request), fields(role = %request.role))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<UserSummary> {
        let request = self
            .gateway
            .json_request(HttpMethod::Post, REGISTER_PATH, request)?;
        self.authenticate(request).await
    }

    /// Fetch the signed-in user's profile and refresh the user mirror.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<UserSummary> {
        if !self.store.is_authenticated().await {
            return Err(AuthError::NotAuthenticated);
        }

        let me: MeResponse = self
            .gateway
            .send_json(HttpRequest::get(self.gateway.endpoint(ME_PATH)))
            .await?;

        self.store.update_user_summary(&me.user).await;
        Ok(me.user)
    }

    /// Sign out. Never fails: the server call is best-effort and local state
    /// is cleared regardless.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if self.store.is_authenticated().await {
            let request = HttpRequest::post(self.gateway.endpoint(LOGOUT_PATH));
            match self.gateway.execute_without_refresh(request).await {
                Ok(response) if response.is_success() => debug!("Server acknowledged logout"),
                Ok(response) => {
                    warn!(status = response.status, "Server rejected logout");
                }
                Err(e) => warn!(error = %e, "Logout request failed"),
            }
        }

        self.store.clear_session().await;
        info!("Signed out");
        let _ = self.event_bus.emit(CoreEvent::Auth(AuthEvent::SignedOut));
    }

    pub async fn auth_state(&self) -> AuthState {
        if self.store.is_authenticated().await {
            AuthState::SignedIn
        } else {
            AuthState::SignedOut
        }
    }

    /// True when signed in and the cached user holds one of `roles`.
    ///
    /// An empty `roles` slice only checks that someone is signed in.
    pub async fn has_role(&self, roles: &[UserRole]) -> bool {
        if !self.store.is_authenticated().await {
            return false;
        }
        if roles.is_empty() {
            return true;
        }
        self.store
            .get_user_summary()
            .await
            .map_or(false, |user| roles.contains(&user.role))
    }

    async fn authenticate(&self, request: HttpRequest) -> Result<UserSummary> {
        let response = self.gateway.execute_anonymous(request).await?;

        if !response.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .map(|body| body.error)
                .unwrap_or_else(|_| format!("server returned {}", response.status));
            warn!(status = response.status, error = %message, "Authentication rejected");
            return Err(AuthError::AuthenticationFailed(message));
        }

        let body: AuthResponse = response
            .json()
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        if body.access_token.is_empty() {
            return Err(AuthError::AuthenticationFailed(
                "server returned an empty token".to_string(),
            ));
        }

        let expires_at = SessionCredentials::expiry_after(
            self.gateway.clock().now(),
            self.gateway.settings().token_ttl,
        )
        .ok_or_else(|| {
            AuthError::AuthenticationFailed("token lifetime is out of range".to_string())
        })?;
        let session = SessionCredentials::new(
            body.access_token,
            body.refresh_token.unwrap_or_default(),
            Some(body.user.clone()),
            expires_at,
        );
        self.store.set_session(&session).await;

        info!(user_id = %body.user.id, role = %body.user.role, "Signed in");
        let _ = self.event_bus.emit(CoreEvent::Auth(AuthEvent::SignedIn {
            user_id: body.user.id.clone(),
        }));

        Ok(body.user)
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}
