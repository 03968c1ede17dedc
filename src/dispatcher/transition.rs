//! Dispatcher state and transitions

use super::{
    Effect, Event, ERROR_BANNER, FALLBACK_MESSAGE, UPLOAD_FAILURE_BANNER, UPLOAD_SUCCESS_BANNER,
};
use crate::backend::{Answer, BackendError, DocumentKind};
use crate::config::SubmitPolicy;
use crate::exchange::{Exchange, ExchangeId, ExchangeStore, ResolveOutcome};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during a transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("A request is already in progress, wait for it to finish")]
    Busy,
    #[error("Unsupported document {path}: only .pdf, .doc and .docx are accepted")]
    UnsupportedDocument { path: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerLevel {
    Info,
    Error,
}

/// Transient conversation-level notice, separate from any exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub level: BannerLevel,
    pub message: String,
}

impl Banner {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Error,
            message: message.into(),
        }
    }
}

/// Everything the projection needs to draw one frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatSnapshot {
    pub exchanges: Vec<Exchange>,
    pub banner: Option<Banner>,
    pub input: String,
    /// True while any exchange is pending or an upload is running
    pub busy: bool,
}

impl ChatSnapshot {
    pub fn exchange(&self, id: ExchangeId) -> Option<&Exchange> {
        self.exchanges.iter().find(|e| e.id() == id)
    }
}

/// Owns the conversation log and the UI-level state around it.
///
/// All mutation goes through [`Dispatcher::handle`]; the returned effects
/// are the only way work leaves this type.
#[derive(Debug)]
pub struct Dispatcher {
    store: ExchangeStore,
    banner: Option<Banner>,
    input: String,
    policy: SubmitPolicy,
    uploads_in_flight: usize,
    /// Bumped by every reset; uploads from an older generation are stale
    generation: u64,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(SubmitPolicy::default())
    }
}

impl Dispatcher {
    pub fn new(policy: SubmitPolicy) -> Self {
        Self {
            store: ExchangeStore::new(),
            banner: None,
            input: String::new(),
            policy,
            uploads_in_flight: 0,
            generation: 0,
        }
    }

    pub fn store(&self) -> &ExchangeStore {
        &self.store
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_busy(&self) -> bool {
        self.store.pending_count() > 0 || self.uploads_in_flight > 0
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            exchanges: self.store.all().to_vec(),
            banner: self.banner.clone(),
            input: self.input.clone(),
            busy: self.is_busy(),
        }
    }

    /// Apply one event.
    ///
    /// Backend events never fail; user events fail only when rejected by the
    /// submit policy or upload validation, leaving state untouched.
    pub fn handle(&mut self, event: Event) -> Result<Vec<Effect>, DispatchError> {
        match event {
            Event::Submit { text } => self.submit(text),
            Event::InputChanged { text } => {
                self.input = text;
                Ok(vec![Effect::NotifyProjection])
            }
            Event::Reset => {
                self.reset();
                Ok(vec![Effect::NotifyProjection])
            }
            Event::UploadRequested { path } => self.request_upload(&path),
            Event::AskSettled { id, result } => Ok(self.settle(id, result)),
            Event::UploadSettled {
                file_name,
                generation,
                result,
            } => Ok(self.settle_upload(&file_name, generation, result)),
        }
    }

    fn check_policy(&self) -> Result<(), DispatchError> {
        match self.policy {
            SubmitPolicy::SingleFlight if self.is_busy() => Err(DispatchError::Busy),
            _ => Ok(()),
        }
    }

    fn submit(&mut self, text: String) -> Result<Vec<Effect>, DispatchError> {
        if text.trim().is_empty() {
            tracing::debug!("Ignoring blank submission");
            return Ok(vec![]);
        }
        self.check_policy()?;

        let id = self.store.append(text.clone());
        self.input.clear();
        self.banner = None;
        tracing::info!(exchange_id = %id, "Question submitted");

        Ok(vec![
            Effect::Ask { id, question: text },
            Effect::NotifyProjection,
        ])
    }

    fn settle(&mut self, id: ExchangeId, result: Result<Answer, BackendError>) -> Vec<Effect> {
        let outcome = match result {
            Ok(answer) => self.store.resolve(id, answer.text, false),
            Err(e) => {
                let outcome = self.store.resolve(id, FALLBACK_MESSAGE, true);
                if outcome.is_applied() {
                    tracing::warn!(exchange_id = %id, kind = ?e.kind, error = %e, "Exchange failed");
                    self.banner = Some(Banner::error(ERROR_BANNER));
                }
                outcome
            }
        };

        match outcome {
            ResolveOutcome::Applied(status) => {
                tracing::info!(exchange_id = %id, status = ?status, "Exchange resolved");
                vec![Effect::NotifyProjection]
            }
            ResolveOutcome::UnknownExchange | ResolveOutcome::AlreadyResolved(_) => vec![],
        }
    }

    fn reset(&mut self) {
        let dropped = self.store.len();
        let pending = self.store.pending_count();
        let uploads = self.uploads_in_flight;
        self.store.reset();
        self.banner = None;
        self.input.clear();
        self.uploads_in_flight = 0;
        self.generation += 1;
        tracing::info!(dropped, pending, uploads, "Conversation reset");
    }

    fn settle_upload(
        &mut self,
        file_name: &str,
        generation: u64,
        result: Result<(), BackendError>,
    ) -> Vec<Effect> {
        if generation != self.generation {
            tracing::debug!(file = %file_name, "Ignoring upload from before reset");
            return vec![];
        }

        self.uploads_in_flight = self.uploads_in_flight.saturating_sub(1);
        self.banner = Some(match result {
            Ok(()) => Banner::info(UPLOAD_SUCCESS_BANNER),
            Err(e) => {
                tracing::warn!(file = %file_name, error = %e, "Upload rejected");
                Banner::error(
                    e.server_message
                        .unwrap_or_else(|| UPLOAD_FAILURE_BANNER.to_string()),
                )
            }
        });
        vec![Effect::NotifyProjection]
    }

    fn request_upload(&mut self, path: &Path) -> Result<Vec<Effect>, DispatchError> {
        let kind =
            DocumentKind::from_path(path).ok_or_else(|| DispatchError::UnsupportedDocument {
                path: path.display().to_string(),
            })?;
        self.check_policy()?;

        self.uploads_in_flight += 1;
        self.banner = None;
        Ok(vec![
            Effect::Upload {
                path: path.to_path_buf(),
                kind,
                generation: self.generation,
            },
            Effect::NotifyProjection,
        ])
    }
}
