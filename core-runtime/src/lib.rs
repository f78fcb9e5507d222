//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the session client:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the authentication core depends
//! on. It resolves host bridges into a validated [`CoreConfig`], installs the
//! `tracing` subscriber, and carries session lifecycle events to the host.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder, StorageMode};
pub use error::{Error, Result};
pub use events::{AuthEvent, CoreEvent, EventBus, EventStream, SessionClearReason};
