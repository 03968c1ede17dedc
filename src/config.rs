//! Environment configuration

use crate::sections::DEFAULT_SEPARATOR_WIDTH;
use std::time::Duration;

pub const DEFAULT_ASK_BASE_URL: &str = "http://127.0.0.1:8800";
pub const DEFAULT_CHAT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Which wire contract the backend speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendContract {
    /// `POST /api/ask` with `{question}` -> `{answer}`
    #[default]
    Ask,
    /// `POST /chat` with `{message}` -> `{response}` | `{error}`, plus `/upload`
    Chat,
}

impl BackendContract {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ask" | "a" => Some(Self::Ask),
            "chat" | "b" => Some(Self::Chat),
            _ => None,
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Ask => DEFAULT_ASK_BASE_URL,
            Self::Chat => DEFAULT_CHAT_BASE_URL,
        }
    }
}

/// Whether a second question may be submitted while one is outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPolicy {
    /// Reject submissions while any exchange is pending
    #[default]
    SingleFlight,
    /// Every submission runs; completions reconcile by id
    Concurrent,
}

impl SubmitPolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single_flight" | "single-flight" | "single" => Some(Self::SingleFlight),
            "concurrent" => Some(Self::Concurrent),
            _ => None,
        }
    }
}

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub contract: BackendContract,
    pub base_url: String,
    /// Upper bound on one remote call; `None` waits forever
    pub request_timeout: Option<Duration>,
    pub submit_policy: SubmitPolicy,
    pub separator_width: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            contract: BackendContract::Ask,
            base_url: DEFAULT_ASK_BASE_URL.to_string(),
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            submit_policy: SubmitPolicy::SingleFlight,
            separator_width: DEFAULT_SEPARATOR_WIDTH,
        }
    }
}

impl ChatConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Invalid values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let contract = parse_or(
            &lookup,
            "LAWGPT_BACKEND",
            BackendContract::default(),
            BackendContract::parse,
        );

        let base_url = lookup("LAWGPT_BASE_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| contract.default_base_url().to_string());

        let request_timeout = match lookup("LAWGPT_REQUEST_TIMEOUT_SECS") {
            None => Some(DEFAULT_REQUEST_TIMEOUT),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => None,
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    tracing::warn!(value = %raw, "Invalid LAWGPT_REQUEST_TIMEOUT_SECS, using default");
                    Some(DEFAULT_REQUEST_TIMEOUT)
                }
            },
        };

        let submit_policy = parse_or(
            &lookup,
            "LAWGPT_SUBMIT_POLICY",
            SubmitPolicy::default(),
            SubmitPolicy::parse,
        );

        let separator_width = parse_or(
            &lookup,
            "LAWGPT_SEPARATOR_WIDTH",
            DEFAULT_SEPARATOR_WIDTH,
            |raw| raw.trim().parse::<usize>().ok().filter(|w| *w > 0),
        );

        Self {
            contract,
            base_url,
            request_timeout,
            submit_policy,
            separator_width,
        }
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => parse(&raw).unwrap_or_else(|| {
            tracing::warn!(key = %key, value = %raw, "Invalid configuration value, using default");
            default
        }),
    }
}
