//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Token store error: {0}")]
    TokenStore(String),

    /// Request did not complete (connect, TLS, read). Status-code failures are not errors.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Payload error: {0}")]
    Payload(String),

    #[error("Batch source error: {0}")]
    Source(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dispatch worker is not running")]
    WorkerStopped,
}
