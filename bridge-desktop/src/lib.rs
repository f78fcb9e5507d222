//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides the implementations the session client uses when it
//! runs outside a browser:
//! - `HttpClient` using `reqwest` with a shared cookie jar
//! - `KeyValueStore` backed by a JSON file in the user data directory
//! - `KeyValueStore` backed by an in-memory map (tests, ephemeral sessions)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{FileKeyValueStore, ReqwestHttpClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let http_client = Arc::new(ReqwestHttpClient::try_new()?);
//!     let storage = Arc::new(FileKeyValueStore::new(FileKeyValueStore::default_path()));
//!
//!     // Use in core configuration
//!     Ok(())
//! }
//! ```

mod http;
mod kv_store;

pub use http::ReqwestHttpClient;
pub use kv_store::{FileKeyValueStore, MemoryKeyValueStore};
