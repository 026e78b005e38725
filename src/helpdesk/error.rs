//! Helpdesk error types

use thiserror::Error;

/// Helpdesk error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HelpdeskError {
    pub kind: HelpdeskErrorKind,
    pub message: String,
}

impl HelpdeskError {
    pub fn new(kind: HelpdeskErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(HelpdeskErrorKind::Network, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(HelpdeskErrorKind::Auth, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(HelpdeskErrorKind::NotFound, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(HelpdeskErrorKind::ServerError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(HelpdeskErrorKind::InvalidResponse, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(HelpdeskErrorKind::Unknown, message)
    }

    /// Classify a non-success HTTP status returned by the helpdesk
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 | 403 => Self::auth(format!("Authentication failed: {body}")),
            404 => Self::not_found(format!("Not found: {body}")),
            500..=599 => Self::server_error(format!("Server error: {body}")),
            _ => Self::unknown(format!("HTTP {status}: {body}")),
        }
    }
}

/// Error classification, used for logging and HTTP status mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpdeskErrorKind {
    /// Connection failures and timeouts
    Network,
    /// Rejected API token (401, 403)
    Auth,
    /// Unknown account, contact or conversation (404)
    NotFound,
    /// Helpdesk-side failure (5xx)
    ServerError,
    /// Response arrived but did not carry what we needed
    InvalidResponse,
    Unknown,
}

impl HelpdeskErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Auth => "auth",
            Self::NotFound => "not_found",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::Unknown => "unknown",
        }
    }
}
