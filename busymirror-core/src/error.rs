//! Error types for busymirror.

use thiserror::Error;

/// Errors raised by configuration, connectors and the provider protocol.
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("Invalid interval: {0}")]
    Interval(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for busymirror operations.
pub type MirrorResult<T> = Result<T, MirrorError>;
