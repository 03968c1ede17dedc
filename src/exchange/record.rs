//! Exchange record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier handed out by [`super::ExchangeStore::append`].
///
/// Monotonic per store and never reused, including across resets, so a
/// completion that outlives a reset cannot land on a newer exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeId(u64);

impl ExchangeId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeStatus {
    Pending,
    Fulfilled,
    Failed,
}

impl ExchangeStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ExchangeStatus::Pending)
    }
}

/// One question and, once resolved, its answer.
///
/// Fields are private so the `pending <=> no answer` invariant can only be
/// changed through [`Exchange::settle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exchange {
    id: ExchangeId,
    question: String,
    answer: Option<String>,
    status: ExchangeStatus,
    created_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
}

impl Exchange {
    pub(super) fn pending(id: ExchangeId, question: String) -> Self {
        Self {
            id,
            question,
            answer: None,
            status: ExchangeStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    /// Move a pending exchange to its terminal status. Returns false and
    /// leaves the record untouched if it was already settled.
    pub(super) fn settle(&mut self, answer: String, is_error: bool) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = if is_error {
            ExchangeStatus::Failed
        } else {
            ExchangeStatus::Fulfilled
        };
        self.answer = Some(answer);
        self.resolved_at = Some(Utc::now());
        true
    }

    pub fn id(&self) -> ExchangeId {
        self.id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn status(&self) -> ExchangeStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == ExchangeStatus::Pending
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }
}
