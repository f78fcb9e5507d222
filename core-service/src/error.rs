use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Authentication error: {0}")]
    Auth(#[from] core_auth::AuthError),

    #[error("Request failed: {0}")]
    Gateway(#[from] core_auth::GatewayError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
