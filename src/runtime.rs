//! Runtime for driving a conversation
//!
//! One task owns the [`Dispatcher`]. Handles send it events over a channel;
//! remote calls run as spawned tasks and report back on a second channel, so
//! the owner never blocks on I/O. Every change is published as a
//! [`ChatSnapshot`] on a watch channel.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::ChatRuntime;

use crate::dispatcher::{ChatSnapshot, DispatchError, Event};
use crate::exchange::{Exchange, ExchangeId};
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use uuid::Uuid;

/// Errors surfaced to handle callers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error(transparent)]
    Rejected(#[from] DispatchError),
    #[error("Conversation runtime has stopped")]
    Stopped,
}

/// A user event plus the channel its outcome is reported on
pub(crate) struct Command {
    pub event: Event,
    pub reply: oneshot::Sender<Result<Option<ExchangeId>, DispatchError>>,
}

/// Handle to interact with a running conversation
#[derive(Clone)]
pub struct ChatHandle {
    session_id: Uuid,
    command_tx: mpsc::Sender<Command>,
    snapshot_rx: watch::Receiver<ChatSnapshot>,
}

impl ChatHandle {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    async fn dispatch(&self, event: Event) -> Result<Option<ExchangeId>, ChatError> {
        let (reply, outcome) = oneshot::channel();
        self.command_tx
            .send(Command { event, reply })
            .await
            .map_err(|_| ChatError::Stopped)?;
        Ok(outcome.await.map_err(|_| ChatError::Stopped)??)
    }

    /// Submit a question.
    ///
    /// Returns the new exchange id, or `None` when the text was blank.
    pub async fn submit(&self, text: impl Into<String>) -> Result<Option<ExchangeId>, ChatError> {
        self.dispatch(Event::submit(text)).await
    }

    /// Update the draft input shown by the projection
    pub async fn set_input(&self, text: impl Into<String>) -> Result<(), ChatError> {
        self.dispatch(Event::InputChanged { text: text.into() })
            .await
            .map(|_| ())
    }

    /// Clear the conversation. Calls still in flight are ignored when they land.
    pub async fn reset(&self) -> Result<(), ChatError> {
        self.dispatch(Event::Reset).await.map(|_| ())
    }

    /// Start uploading a reference document
    pub async fn upload(&self, path: impl Into<PathBuf>) -> Result<(), ChatError> {
        self.dispatch(Event::UploadRequested { path: path.into() })
            .await
            .map(|_| ())
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> ChatSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that wakes on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Wait until a snapshot satisfies `predicate`
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&ChatSnapshot) -> bool,
    ) -> Result<ChatSnapshot, ChatError> {
        let mut rx = self.snapshot_rx.clone();
        let snapshot = rx
            .wait_for(predicate)
            .await
            .map_err(|_| ChatError::Stopped)?
            .clone();
        Ok(snapshot)
    }

    /// Wait until exchange `id` leaves pending.
    ///
    /// Returns `None` if the exchange was discarded by a reset first.
    pub async fn wait_for_exchange(&self, id: ExchangeId) -> Result<Option<Exchange>, ChatError> {
        let snapshot = self
            .wait_for(|s| !matches!(s.exchange(id), Some(e) if e.is_pending()))
            .await?;
        Ok(snapshot.exchange(id).cloned())
    }

    /// Wait until no exchange is pending and no upload is running
    pub async fn wait_idle(&self) -> Result<ChatSnapshot, ChatError> {
        self.wait_for(|s| !s.busy).await
    }
}
