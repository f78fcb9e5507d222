//! Intransparency session client.
//!
//! This crate exposes the workspace through one dependency. Host
//! applications depend on `intransparency-client`, pick features here, and
//! reach the individual crates through the re-exports below.
//!
//! ```no_run
//! # async fn example() -> intransparency_client::Result<()> {
//! use intransparency_client::{bootstrap_from_env, HttpRequest};
//!
//! let core = bootstrap_from_env().await?;
//! core.sessions().login("jane@example.com", "correct horse").await?;
//!
//! let request = HttpRequest::get(core.config().endpoint("/api/jobs"));
//! let response = core.gateway().execute(request).await?;
//! # Ok(())
//! # }
//! ```

pub use bridge_traits;
pub use core_auth;
pub use core_runtime;

pub use bridge_traits::{HttpRequest, HttpResponse};
pub use core_auth::{AuthState, RegisterRequest, UserRole, UserSummary};
pub use core_runtime::config::{CoreConfig, StorageMode};
pub use core_runtime::events::{AuthEvent, CoreEvent};
pub use core_service::{bootstrap_from_env, CoreError, CoreService, Result};
