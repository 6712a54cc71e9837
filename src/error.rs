//! Error types for the portal client

use thiserror::Error;

/// Error codes for portal errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalErrorCode {
    /// Network request failed or the backend was unreachable
    NetworkError,
    /// Invalid request parameters (local or backend-reported)
    ValidationError,
    /// Resource not found
    NotFound,
    /// Missing or rejected auth token
    Unauthorized,
    /// Backend returned a 5xx
    ServerError,
    /// Response body could not be decoded
    DecodeError,
    /// The owning page went away before the request finished
    Cancelled,
}

impl std::fmt::Display for PortalErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError => write!(f, "NETWORK_ERROR"),
            Self::ValidationError => write!(f, "VALIDATION_ERROR"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::ServerError => write!(f, "SERVER_ERROR"),
            Self::DecodeError => write!(f, "DECODE_ERROR"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Portal client error
#[derive(Debug, Clone, Error)]
#[error("{message} (code: {code})")]
pub struct PortalError {
    /// Error code
    pub code: PortalErrorCode,
    /// Human-readable message, taken from the backend when it sent one
    pub message: String,
    /// HTTP status code (for API errors)
    pub status_code: Option<u16>,
    /// The `detail`/`message` field of the backend's error body, if it sent one
    pub detail: Option<String>,
}

impl PortalError {
    pub fn new(code: PortalErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status_code: None,
            detail: None,
        }
    }

    pub fn with_status(code: PortalErrorCode, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            code,
            message: message.into(),
            status_code: Some(status_code),
            detail: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(PortalErrorCode::ValidationError, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PortalErrorCode::NetworkError, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(PortalErrorCode::DecodeError, message)
    }

    pub fn cancelled() -> Self {
        Self::new(PortalErrorCode::Cancelled, "Request cancelled")
    }

    pub fn is_cancelled(&self) -> bool {
        self.code == PortalErrorCode::Cancelled
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return Self::decode(format!("Failed to parse backend response: {}", e));
        }
        match e.status() {
            Some(status) => Self::with_status(
                map_status_to_error_code(status.as_u16()),
                e.to_string(),
                status.as_u16(),
            ),
            None => Self::network(format!("Backend request failed: {}", e)),
        }
    }
}

/// Result type for portal operations
pub type Result<T> = std::result::Result<T, PortalError>;

/// Map HTTP status code to error code
pub(crate) fn map_status_to_error_code(status: u16) -> PortalErrorCode {
    match status {
        400 | 409 | 422 => PortalErrorCode::ValidationError,
        401 | 403 => PortalErrorCode::Unauthorized,
        404 => PortalErrorCode::NotFound,
        500..=599 => PortalErrorCode::ServerError,
        _ => PortalErrorCode::NetworkError,
    }
}
