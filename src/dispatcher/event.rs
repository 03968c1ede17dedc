//! Events that drive the dispatcher

use crate::backend::{Answer, BackendError};
use crate::exchange::ExchangeId;
use std::path::PathBuf;

/// Events that trigger dispatcher transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Submit {
        text: String,
    },
    InputChanged {
        text: String,
    },
    Reset,
    UploadRequested {
        path: PathBuf,
    },

    // Backend events
    AskSettled {
        id: ExchangeId,
        result: Result<Answer, BackendError>,
    },
    UploadSettled {
        file_name: String,
        /// Conversation generation the upload was started in
        generation: u64,
        result: Result<(), BackendError>,
    },
}

impl Event {
    pub fn submit(text: impl Into<String>) -> Self {
        Event::Submit { text: text.into() }
    }

    pub fn answered(id: ExchangeId, text: impl Into<String>) -> Self {
        Event::AskSettled {
            id,
            result: Ok(Answer::new(text)),
        }
    }

    pub fn failed(id: ExchangeId, error: BackendError) -> Self {
        Event::AskSettled {
            id,
            result: Err(error),
        }
    }
}
