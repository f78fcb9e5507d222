use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role as reported by the backend.
///
/// Unknown values deserialize to [`UserRole::Other`] so that a newer backend
/// never makes a stored session unreadable.
///
/// # Examples
///
/// ```
/// use core_auth::UserRole;
///
/// let role: UserRole = serde_json::from_str("\"recruiter\"").unwrap();
/// assert_eq!(role, UserRole::Recruiter);
///
/// let role: UserRole = serde_json::from_str("\"astronaut\"").unwrap();
/// assert_eq!(role, UserRole::Other);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Professional,
    Recruiter,
    University,
    Admin,
    #[default]
    #[serde(other)]
    Other,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Professional => "professional",
            UserRole::Recruiter => "recruiter",
            UserRole::University => "university",
            UserRole::Admin => "admin",
            UserRole::Other => "other",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-sensitive projection of the signed-in user.
///
/// Parsing ignores unknown fields, so a full backend user object can be
/// narrowed to a summary directly:
///
/// ```
/// use core_auth::{UserRole, UserSummary};
///
/// let json = r#"{
///     "id": "u1",
///     "email": "jane@example.com",
///     "firstName": "Jane",
///     "lastName": "Doe",
///     "role": "student",
///     "university": "Politecnico di Milano"
/// }"#;
///
/// let user: UserSummary = serde_json::from_str(json).unwrap();
/// assert_eq!(user.role, UserRole::Student);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: UserRole,
}

/// Session material persisted by the credential store.
///
/// The JSON form uses camelCase keys and stores `expiresAt` as epoch
/// milliseconds, which is also what the cookie endpoints exchange. Build
/// sessions with [`SessionCredentials::new`] so that `expires_at` already has
/// that precision and survives a store round-trip unchanged.
///
/// # Security
///
/// Tokens should never be logged. The `Debug` implementation redacts them.
///
/// # Examples
///
/// ```
/// use core_auth::SessionCredentials;
/// use chrono::{Duration, Utc};
///
/// let session = SessionCredentials::new("A1", "R1", None, Utc::now() + Duration::hours(1));
///
/// assert!(!session.is_expired_at(Utc::now()));
/// assert!(!format!("{:?}", session).contains("A1"));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredentials {
    /// Short-lived bearer credential
    pub access_token: String,
    /// Used only to mint new access tokens. Empty means "none".
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub user: Option<UserSummary>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl SessionCredentials {
    /// `expires_at` is truncated to whole milliseconds.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        user: Option<UserSummary>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            user,
            expires_at: expires_at.trunc_subsecs(3),
        }
    }

    /// Expiry `ttl` after `now`, or `None` if that instant is not
    /// representable.
    pub fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> Option<DateTime<Utc>> {
        now.checked_add_signed(ttl)
    }

    /// True once `now` has reached `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("user", &self.user.as_ref().map(|u| &u.id))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Coarse authentication state derived from the credential store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::SignedIn)
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthState::SignedOut => write!(f, "Signed Out"),
            AuthState::SignedIn => write!(f, "Signed In"),
        }
    }
}

/// Credentials for `POST /api/auth/login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Account details for `POST /api/auth/register`.
///
/// Student fields (`university`, `major`, `graduation_year`) and recruiter
/// fields (`company`, `position`) are optional and omitted when unset.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graduation_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl RegisterRequest {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role,
            university: None,
            major: None,
            graduation_year: None,
            company: None,
            position: None,
        }
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}
