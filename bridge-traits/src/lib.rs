//! # Host Bridge Traits
//!
//! Capability traits that the session client needs from its host.
//!
//! ## Overview
//!
//! The client core never talks to a concrete storage engine or HTTP stack.
//! Instead it depends on the small set of traits defined here, and each host
//! (desktop binary, test harness, embedded webview shell) injects its own
//! implementation at construction time.
//!
//! ## Traits
//!
//! - [`KeyValueStore`](storage::KeyValueStore) - String-keyed persistent slots
//!   (the equivalent of browser local storage)
//! - [`HttpClient`](http::HttpClient) - Async HTTP execution
//! - [`Clock`](time::Clock) - Time source for deterministic expiry checks
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Available |
//! | Tests    | in-crate mocks      | ✅ Available |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors into it and keep secret values out of the
//! error messages.
//!
//! ## Thread Safety
//!
//! Every trait requires `Send + Sync` so implementations can be shared behind
//! `Arc` across async tasks.
//!
//! ## Examples
//!
//! ### Implementing KeyValueStore
//!
//! ```ignore
//! use bridge_traits::storage::KeyValueStore;
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct MyStore;
//!
//! #[async_trait]
//! impl KeyValueStore for MyStore {
//!     async fn get_item(&self, key: &str) -> Result<Option<String>> { todo!() }
//!     async fn set_item(&self, key: &str, value: &str) -> Result<()> { todo!() }
//!     async fn remove_item(&self, key: &str) -> Result<()> { todo!() }
//!     async fn keys(&self) -> Result<Vec<String>> { todo!() }
//! }
//! ```

pub mod error;
pub mod http;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use storage::KeyValueStore;
pub use time::{Clock, SystemClock};
