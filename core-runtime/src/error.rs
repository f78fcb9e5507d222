use thiserror::Error;

/// Errors raised while configuring the client runtime.
#[derive(Error, Debug)]
pub enum Error {
    /// A setting is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A host bridge was not injected and no platform default exists.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    /// The global tracing subscriber could not be installed.
    #[error("Logging error: {0}")]
    Logging(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
