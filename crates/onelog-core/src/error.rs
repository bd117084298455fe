//! Error types

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised by configuration and dispatch
#[derive(Error, Debug)]
pub enum OnelogError {
    /// The adapter could not be constructed or failed its capability check
    #[error("Invalid logging backend '{backend}': {reason}")]
    InvalidBackendAdapter { backend: String, reason: String },

    /// Fallback dispatch found no usable default level
    #[error("Could not find a default level to fall back to for backend '{backend}'")]
    NoDefaultLevelAvailable { backend: String },

    /// `stop`/`timeEnd` on a label that was never started
    #[error("Unknown timer label: {0}")]
    UnknownTimerLabel(String),

    /// Method is not part of the configured method set
    #[error("Unknown logging method: {0}")]
    UnknownMethod(String),

    /// No backend registered under this name
    #[error("Unknown logging backend: {0}")]
    UnknownBackend(String),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OnelogError {
    /// Create an invalid adapter error
    pub fn invalid_adapter(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBackendAdapter {
            backend: backend.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing default level error
    pub fn no_default_level(backend: impl Into<String>) -> Self {
        Self::NoDefaultLevelAvailable {
            backend: backend.into(),
        }
    }
}

pub type OnelogResult<T> = Result<T, OnelogError>;
