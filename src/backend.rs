//! Backend abstraction
//!
//! The conversation core only sees the [`AskBackend`] capability. Two wire
//! contracts implement it: the `/api/ask` service and the `/chat` + `/upload`
//! service.

mod ask_api;
mod chat_api;
mod error;

pub use ask_api::{AskApiBackend, HealthStatus};
pub use chat_api::ChatApiBackend;
pub use error::{BackendError, BackendErrorKind};

use crate::config::{BackendContract, ChatConfig};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Answer text returned by a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
}

impl Answer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Document formats the upload endpoint accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
}

impl DocumentKind {
    /// Kind from the file extension, case-insensitive
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "doc" => Some(Self::Doc),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Doc => "application/msword",
            Self::Docx => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        }
    }
}

/// A document read from disk, ready to send
#[derive(Debug, Clone)]
pub struct UploadDocument {
    pub file_name: String,
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

/// Capability the dispatcher is built on
#[async_trait]
pub trait AskBackend: Send + Sync {
    /// Ask one question
    async fn ask(&self, question: &str) -> Result<Answer, BackendError>;

    /// Upload a reference document. Contracts without an upload endpoint
    /// keep the default.
    async fn upload(&self, document: &UploadDocument) -> Result<(), BackendError> {
        Err(BackendError::unsupported(format!(
            "{} backend does not accept uploads ({})",
            self.name(),
            document.file_name
        )))
    }

    /// Short name for logs
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: AskBackend + ?Sized> AskBackend for Arc<T> {
    async fn ask(&self, question: &str) -> Result<Answer, BackendError> {
        (**self).ask(question).await
    }

    async fn upload(&self, document: &UploadDocument) -> Result<(), BackendError> {
        (**self).upload(document).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Logging wrapper for backends
pub struct LoggingBackend<B> {
    inner: B,
}

impl<B: AskBackend> LoggingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<B: AskBackend> AskBackend for LoggingBackend<B> {
    async fn ask(&self, question: &str) -> Result<Answer, BackendError> {
        let start = Instant::now();
        let result = self.inner.ask(question).await;
        let duration = start.elapsed();

        match &result {
            Ok(answer) => {
                tracing::info!(
                    backend = %self.inner.name(),
                    duration_ms = %duration.as_millis(),
                    answer_chars = answer.text.chars().count(),
                    "Ask request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    backend = %self.inner.name(),
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    error = %e.message,
                    "Ask request failed"
                );
            }
        }

        result
    }

    async fn upload(&self, document: &UploadDocument) -> Result<(), BackendError> {
        let start = Instant::now();
        let result = self.inner.upload(document).await;
        match &result {
            Ok(()) => tracing::info!(
                backend = %self.inner.name(),
                file = %document.file_name,
                bytes = document.bytes.len(),
                duration_ms = %start.elapsed().as_millis(),
                "Upload completed"
            ),
            Err(e) => tracing::error!(
                backend = %self.inner.name(),
                file = %document.file_name,
                kind = ?e.kind,
                error = %e.message,
                "Upload failed"
            ),
        }
        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Build the configured backend, wrapped for logging
pub fn create_backend(config: &ChatConfig) -> Arc<dyn AskBackend> {
    match config.contract {
        BackendContract::Ask => Arc::new(LoggingBackend::new(AskApiBackend::new(
            config.base_url.clone(),
        ))),
        BackendContract::Chat => Arc::new(LoggingBackend::new(ChatApiBackend::new(
            config.base_url.clone(),
        ))),
    }
}
