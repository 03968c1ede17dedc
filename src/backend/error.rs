//! Backend error types

use thiserror::Error;

/// Backend failure with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
    /// Text the server itself reported (Contract B `{"error": ...}`)
    pub server_message: Option<String>,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            server_message: None,
        }
    }

    pub fn with_server_message(mut self, text: impl Into<String>) -> Self {
        self.server_message = Some(text.into());
        self
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Transport, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Timeout, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Server, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Unsupported, message)
    }

    /// Map a `reqwest` send/read failure
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(format!("Request timeout: {e}"))
        } else if e.is_connect() {
            Self::transport(format!("Connection failed: {e}"))
        } else {
            Self::transport(format!("Request failed: {e}"))
        }
    }
}

/// Error classification.
///
/// Callers treat every kind the same way (a failed exchange); the kind
/// exists for logging and for the upload banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Backend unreachable, connection dropped
    Transport,
    /// No reply within the configured bound
    Timeout,
    /// Reachable backend answered with a non-success status or unusable body
    Server,
    /// The backend contract has no such capability
    Unsupported,
}

impl BackendErrorKind {
    pub fn is_transport(self) -> bool {
        matches!(self, Self::Transport | Self::Timeout)
    }
}
