//! # Event Bus System
//!
//! Broadcasts session lifecycle changes to whoever hosts the client, using
//! `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The credential store, the authenticated gateway and the session manager
//! never navigate or render anything themselves. They publish [`CoreEvent`]s
//! and the host reacts: a shell subscribes and routes to the sign-in page on
//! [`AuthEvent::SignInRequired`], a status bar listens for
//! [`AuthEvent::SignedIn`], and so on.
//!
//! ```text
//! ┌──────────────────┐   emit    ┌───────────┐   subscribe   ┌────────────┐
//! │ CredentialStore  ├──────────>│           ├──────────────>│ Host shell │
//! └──────────────────┘           │ EventBus  │               └────────────┘
//! ┌──────────────────┐   emit    │ (broadcast│   subscribe   ┌────────────┐
//! │ AuthGateway      ├──────────>│  channel) ├──────────────>│ Telemetry  │
//! └──────────────────┘           └───────────┘               └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
//!
//! let event_bus = EventBus::new(16);
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Auth(AuthEvent::SignInRequired {
//!         redirect_to: "/auth/login".to_string(),
//!     }))
//!     .ok();
//!
//! let event = subscriber.try_recv().unwrap();
//! assert_eq!(event.description(), "Sign-in required");
//! ```
//!
//! ## Error Handling
//!
//! `emit` fails only when nobody is subscribed. Publishers ignore that case
//! with `.ok()`; an event nobody listens to is not an error.
//!
//! Subscribers may see `RecvError::Lagged(n)` when they fall more than the
//! buffer size behind. That is non-fatal. `RecvError::Closed` means every
//! sender has been dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum published through the event bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Session and authentication events
    Auth(AuthEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Auth(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Auth(e) => e.severity(),
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Authentication Events
// ============================================================================

/// Why a stored session was destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionClearReason {
    /// The caller asked for it (logout, account switch).
    Requested,
    /// `expires_at` was reached when the session was read.
    Expired,
    /// The stored bundle could not be decoded or parsed.
    Corrupted,
    /// The refresh endpoint rejected the refresh token, or there was none.
    RefreshFailed,
}

impl fmt::Display for SessionClearReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SessionClearReason::Requested => "requested",
            SessionClearReason::Expired => "expired",
            SessionClearReason::Corrupted => "corrupted",
            SessionClearReason::RefreshFailed => "refresh_failed",
        };
        f.write_str(text)
    }
}

/// Events related to the stored session and account state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// A session bundle was written to storage.
    SessionStored,
    /// The stored session was removed.
    SessionCleared {
        reason: SessionClearReason,
    },
    /// A 401 triggered a refresh-token exchange.
    TokenRefreshing,
    /// The refresh-token exchange succeeded.
    TokenRefreshed {
        /// Expiry of the newly stored access token.
        expires_at: DateTime<Utc>,
    },
    /// Login or registration succeeded.
    SignedIn {
        user_id: String,
    },
    /// The user signed out explicitly.
    SignedOut,
    /// The session could not be recovered and the host should navigate to
    /// the sign-in route.
    SignInRequired {
        /// Route the host should navigate to (e.g. `/auth/login`).
        redirect_to: String,
    },
    /// A session stored under the old raw `token`/`user` slots was migrated.
    LegacySessionMigrated,
}

impl AuthEvent {
    fn description(&self) -> &str {
        match self {
            AuthEvent::SessionStored => "Session stored",
            AuthEvent::SessionCleared { .. } => "Session cleared",
            AuthEvent::TokenRefreshing => "Refreshing access token",
            AuthEvent::TokenRefreshed { .. } => "Token refreshed successfully",
            AuthEvent::SignedIn { .. } => "User signed in successfully",
            AuthEvent::SignedOut => "User signed out",
            AuthEvent::SignInRequired { .. } => "Sign-in required",
            AuthEvent::LegacySessionMigrated => "Legacy session migrated",
        }
    }

    fn severity(&self) -> EventSeverity {
        match self {
            AuthEvent::SignInRequired { .. } => EventSeverity::Warning,
            AuthEvent::SessionCleared {
                reason: SessionClearReason::Corrupted,
            } => EventSeverity::Warning,
            AuthEvent::SignedIn { .. }
            | AuthEvent::SignedOut
            | AuthEvent::LegacySessionMigrated => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning an `EventBus` yields another handle onto the same channel. Each
/// `subscribe()` creates an independent receiver that only sees events
/// emitted after it was created.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{AuthEvent, CoreEvent, EventBus, EventStream};
///
/// let event_bus = EventBus::new(16);
/// let redirects = EventStream::new(event_bus.subscribe()).filter(|event| {
///     matches!(event, CoreEvent::Auth(AuthEvent::SignInRequired { .. }))
/// });
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn matches(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.matches(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive a matching event without blocking.
    ///
    /// Returns `None` if no matching events are currently buffered.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.matches(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
