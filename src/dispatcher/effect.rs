//! Effects produced by dispatcher transitions

use crate::backend::DocumentKind;
use crate::exchange::ExchangeId;
use std::path::PathBuf;

/// Effects to be executed after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue one remote call; its completion must come back as `AskSettled`
    Ask { id: ExchangeId, question: String },

    /// Read the document and send it to the backend; the completion echoes
    /// `generation` back in `UploadSettled`
    Upload {
        path: PathBuf,
        kind: DocumentKind,
        generation: u64,
    },

    /// Publish a fresh snapshot to the projection
    NotifyProjection,
}

impl Effect {
    /// Exchange created by this effect, if any
    pub fn exchange_id(&self) -> Option<ExchangeId> {
        match self {
            Effect::Ask { id, .. } => Some(*id),
            _ => None,
        }
    }
}
