//! Owned conversation log

use super::{Exchange, ExchangeId, ExchangeStatus};

/// What a [`ExchangeStore::resolve`] call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The pending exchange took the result
    Applied(ExchangeStatus),
    /// No exchange with that id (stale completion after a reset)
    UnknownExchange,
    /// The exchange was already settled; first write wins
    AlreadyResolved(ExchangeStatus),
}

impl ResolveOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, ResolveOutcome::Applied(_))
    }
}

/// Chronologically ordered exchanges.
///
/// Append-only apart from [`reset`](Self::reset) and the single in-place
/// settlement of a pending record. Any number of exchanges may be pending at
/// once; resolution finds its target by id, never by position.
#[derive(Debug, Default)]
pub struct ExchangeStore {
    log: Vec<Exchange>,
    next_id: u64,
}

impl ExchangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new pending exchange and return its id
    pub fn append(&mut self, question: impl Into<String>) -> ExchangeId {
        self.next_id += 1;
        let id = ExchangeId::new(self.next_id);
        self.log.push(Exchange::pending(id, question.into()));
        id
    }

    /// Settle the exchange with `id`.
    ///
    /// Unknown ids are ignored. Settled exchanges are never overwritten.
    pub fn resolve(
        &mut self,
        id: ExchangeId,
        answer: impl Into<String>,
        is_error: bool,
    ) -> ResolveOutcome {
        let Some(exchange) = self.log.iter_mut().find(|e| e.id() == id) else {
            tracing::debug!(exchange_id = %id, "Ignoring resolve for unknown exchange");
            return ResolveOutcome::UnknownExchange;
        };

        if exchange.settle(answer.into(), is_error) {
            ResolveOutcome::Applied(exchange.status())
        } else {
            tracing::debug!(
                exchange_id = %id,
                status = ?exchange.status(),
                "Ignoring duplicate resolve"
            );
            ResolveOutcome::AlreadyResolved(exchange.status())
        }
    }

    /// Drop every exchange. The id counter keeps counting.
    pub fn reset(&mut self) {
        self.log.clear();
    }

    pub fn all(&self) -> &[Exchange] {
        &self.log
    }

    pub fn get(&self, id: ExchangeId) -> Option<&Exchange> {
        self.log.iter().find(|e| e.id() == id)
    }

    pub fn pending_count(&self) -> usize {
        self.log.iter().filter(|e| e.is_pending()).count()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}
