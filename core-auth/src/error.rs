use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    #[error("Secure storage unavailable: {0}")]
    SecureStorageUnavailable(String),

    #[error("Stored session is corrupted: {0}")]
    SessionCorrupted(String),

    #[error("Serialization failed ({context}): {source}")]
    SerializationFailed {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors surfaced by [`AuthGateway`](crate::AuthGateway).
///
/// Non-401 error statuses are not errors at this layer: `execute` hands them
/// back as ordinary responses. Only `send_json` turns them into
/// [`GatewayError::Status`].
#[derive(Error, Debug)]
pub enum GatewayError {
    /// No response was received.
    #[error("Transport error: {0}")]
    Transport(#[from] BridgeError),

    /// The server answered 401 and the session could not be refreshed. The
    /// session has been cleared and a sign-in redirect emitted.
    #[error("Unauthorized: session expired and could not be refreshed")]
    Unauthorized { body: String },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request could not be encoded: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    /// Status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Unauthorized { .. } => Some(401),
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
