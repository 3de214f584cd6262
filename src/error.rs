//! Error types shared across the hosting emulator.

use crate::emulator::Emulators;
use crate::http::{HostingResponse, StatusCode};
use thiserror::Error;

/// Errors produced while resolving or serving a rewrite.
#[derive(Debug, Error)]
pub enum HostingError {
    /// No project could be determined, or the configuration is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An emulator of this kind is already registered.
    #[error("Emulator '{0}' is already running")]
    AlreadyRunning(Emulators),

    /// The resolved backend could not be reached or answered badly.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The resolved backend did not answer in time.
    #[error("Upstream timeout after {0} seconds")]
    Timeout(u64),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl HostingError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        HostingError::Configuration(message.into())
    }

    /// HTTP status this error maps to when surfaced to a client.
    pub fn status(&self) -> StatusCode {
        match self {
            HostingError::Upstream(_) => StatusCode::BAD_GATEWAY,
            HostingError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type for hosting operations.
pub type HostingResult<T> = Result<T, HostingError>;

impl From<HostingError> for HostingResponse {
    fn from(err: HostingError) -> Self {
        HostingResponse::error(err.status(), format!("{}\n", err))
    }
}
