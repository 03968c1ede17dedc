//! Conversation runtime executor

use super::{ChatHandle, Command};
use crate::backend::{Answer, AskBackend, BackendError, UploadDocument};
use crate::config::ChatConfig;
use crate::dispatcher::{ChatSnapshot, DispatchError, Dispatcher, Effect, Event};
use crate::exchange::ExchangeId;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::Instrument;
use uuid::Uuid;

const COMMAND_BUFFER: usize = 32;

/// Runtime that owns one conversation and executes its effects
pub struct ChatRuntime<B>
where
    B: AskBackend + ?Sized + 'static,
{
    session_id: Uuid,
    dispatcher: Dispatcher,
    backend: Arc<B>,
    request_timeout: Option<Duration>,
    command_rx: mpsc::Receiver<Command>,
    /// Completions from spawned calls
    settled_tx: mpsc::UnboundedSender<Event>,
    settled_rx: mpsc::UnboundedReceiver<Event>,
    snapshot_tx: watch::Sender<ChatSnapshot>,
}

impl<B> ChatRuntime<B>
where
    B: AskBackend + ?Sized + 'static,
{
    pub fn new(config: &ChatConfig, backend: Arc<B>) -> (Self, ChatHandle) {
        let session_id = Uuid::new_v4();
        let dispatcher = Dispatcher::new(config.submit_policy);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(dispatcher.snapshot());

        let runtime = Self {
            session_id,
            dispatcher,
            backend,
            request_timeout: config.request_timeout,
            command_rx,
            settled_tx,
            settled_rx,
            snapshot_tx,
        };
        let handle = ChatHandle {
            session_id,
            command_tx,
            snapshot_rx,
        };
        (runtime, handle)
    }

    /// Build the runtime and run it on a background task
    pub fn spawn(config: &ChatConfig, backend: Arc<B>) -> ChatHandle {
        let (runtime, handle) = Self::new(config, backend);
        tokio::spawn(runtime.run());
        handle
    }

    /// Process events until every handle is dropped
    pub async fn run(mut self) {
        tracing::info!(
            session_id = %self.session_id,
            backend = %self.backend.name(),
            "Starting chat runtime"
        );

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    let Some(Command { event, reply }) = command else {
                        break;
                    };
                    let outcome = self.process_event(event);
                    // Caller may have stopped waiting
                    let _ = reply.send(outcome);
                }
                Some(event) = self.settled_rx.recv() => {
                    if let Err(e) = self.process_event(event) {
                        tracing::error!(error = %e, "Backend event rejected");
                    }
                }
            }
        }

        tracing::info!(
            session_id = %self.session_id,
            pending = self.dispatcher.store().pending_count(),
            "Chat runtime stopped"
        );
    }

    fn process_event(&mut self, event: Event) -> Result<Option<ExchangeId>, DispatchError> {
        let effects = self.dispatcher.handle(event).inspect_err(|e| {
            tracing::debug!(error = %e, "Event rejected");
        })?;

        let created = effects.iter().find_map(Effect::exchange_id);
        for effect in effects {
            self.execute_effect(effect);
        }
        Ok(created)
    }

    fn execute_effect(&self, effect: Effect) {
        match effect {
            Effect::Ask { id, question } => {
                let backend = Arc::clone(&self.backend);
                let settled_tx = self.settled_tx.clone();
                let limit = self.request_timeout;
                let span = tracing::info_span!(
                    "ask",
                    session_id = %self.session_id,
                    exchange_id = %id
                );

                let call = async move { bounded(limit, backend.ask(&question)).await };
                tokio::spawn(async move {
                    let result: Result<Answer, BackendError> =
                        supervised(call.instrument(span)).await;
                    // Runtime gone means nobody is left to show the answer
                    let _ = settled_tx.send(Event::AskSettled { id, result });
                });
            }

            Effect::Upload {
                path,
                kind,
                generation,
            } => {
                let backend = Arc::clone(&self.backend);
                let settled_tx = self.settled_tx.clone();
                let limit = self.request_timeout;
                let file_name = display_name(&path);
                let span = tracing::info_span!(
                    "upload",
                    session_id = %self.session_id,
                    file = %file_name
                );

                let document_name = file_name.clone();
                let call = async move {
                    match tokio::fs::read(&path).await {
                        Ok(bytes) => {
                            let document = UploadDocument {
                                file_name: document_name,
                                kind,
                                bytes,
                            };
                            bounded(limit, backend.upload(&document)).await
                        }
                        Err(e) => Err(BackendError::transport(format!(
                            "Failed to read {}: {e}",
                            path.display()
                        ))),
                    }
                };
                tokio::spawn(async move {
                    let result = supervised(call.instrument(span)).await;
                    let _ = settled_tx.send(Event::UploadSettled {
                        file_name,
                        generation,
                        result,
                    });
                });
            }

            Effect::NotifyProjection => {
                self.snapshot_tx.send_replace(self.dispatcher.snapshot());
            }
        }
    }
}

/// Run `call`, failing with a timeout error once `limit` elapses
async fn bounded<T>(
    limit: Option<Duration>,
    call: impl Future<Output = Result<T, BackendError>>,
) -> Result<T, BackendError> {
    let Some(limit) = limit else {
        return call.await;
    };
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(BackendError::timeout(format!(
            "No reply within {}ms",
            limit.as_millis()
        ))),
    }
}

/// Run `call` on its own task. A panic inside it becomes a transport error,
/// so a completion is always delivered.
async fn supervised<T>(
    call: impl Future<Output = Result<T, BackendError>> + Send + 'static,
) -> Result<T, BackendError>
where
    T: Send + 'static,
{
    tokio::spawn(call).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Backend task aborted");
        Err(BackendError::transport(format!("Backend task failed: {e}")))
    })
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
