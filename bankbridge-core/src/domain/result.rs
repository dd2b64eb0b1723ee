//! Result and error types for the core library

use serde_json::Value as JsonValue;
use thiserror::Error;

use super::Provider;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid OAuth state: {0}")]
    InvalidState(String),

    /// Non-2xx answer from a provider. `body` is the upstream payload, or a
    /// JSON string when the provider did not answer with JSON.
    #[error("{provider} API error: HTTP {status}")]
    Upstream {
        provider: Provider,
        status: u16,
        body: JsonValue,
    },

    #[error("{0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Upstream status code, if this error came from a provider response
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the provider rejected the bearer token
    pub fn is_unauthorized(&self) -> bool {
        self.upstream_status() == Some(401)
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
