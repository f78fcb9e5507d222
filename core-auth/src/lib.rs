//! # Authentication Module
//!
//! Session storage and authenticated HTTP for the Intransparency API.
//!
//! ## Overview
//!
//! This crate owns everything about the signed-in session: where the tokens
//! live, how they are attached to requests, and what happens when the server
//! says they are no longer valid.
//!
//! ## Features
//!
//! - Obfuscated session bundle with a plaintext user mirror
//! - Optional server cookie mirror of the session (hardened mode)
//! - Bearer injection with a single refresh-and-retry on `401`
//! - Forced sign-out with a sign-in redirect event when refresh fails
//! - Login, registration, profile and logout flows
//! - One-time migration of the legacy `token`/`user` slots

pub mod backend;
pub mod credential_store;
pub mod error;
pub mod gateway;
pub mod manager;
pub mod obfuscation;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{CookieSyncedBackend, LocalBackend, StorageBackend};
pub use credential_store::CredentialStore;
pub use error::{AuthError, GatewayError, Result};
pub use gateway::{AuthGateway, GatewaySettings, InFlightRequest, RequestState};
pub use manager::SessionManager;
pub use obfuscation::Obfuscator;
pub use types::{
    AuthState, LoginRequest, RegisterRequest, SessionCredentials, UserRole, UserSummary,
};
