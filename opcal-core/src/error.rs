//! Error types for the opcal engine.

use thiserror::Error;

/// Errors that can occur in opcal operations.
///
/// Every variant renders as a short human-readable reason string; the
/// surrounding application shows these near the triggering control.
#[derive(Error, Debug)]
pub enum OpcalError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Remote error: {0}")]
    Transport(String),

    #[error("Remote transport '{0}' not found in PATH")]
    TransportNotInstalled(String),

    #[error("Remote request timed out after {0}s")]
    TransportTimeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for opcal operations.
pub type OpcalResult<T> = Result<T, OpcalError>;
