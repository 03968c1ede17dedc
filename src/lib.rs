//! LawGPT chat core
//!
//! Conversation state machine and structured-answer decoder for a
//! legal-research chat front-end. Backends are injected through
//! [`backend::AskBackend`]; presentation consumes [`dispatcher::ChatSnapshot`]
//! and [`sections::DecodedAnswer`].

pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod exchange;
pub mod runtime;
pub mod sections;
