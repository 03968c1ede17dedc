//! Question/answer exchanges and the conversation log
//!
//! An exchange is created pending when a question is submitted and resolved
//! exactly once when the remote call settles.

mod record;
mod store;


pub use record::{Exchange, ExchangeId, ExchangeStatus};
pub use store::{ExchangeStore, ResolveOutcome};
