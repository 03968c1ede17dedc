//! `/api/ask` contract
//!
//! `POST {base}/api/ask` with `{"question": ...}`, answered by
//! `{"answer": ..., "sources": ..., "query_type": ...}`. Any non-success
//! status is a server error.

use super::{Answer, AskBackend, BackendError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    answer: String,
    #[serde(default)]
    query_type: Option<String>,
}

/// Reply from `GET {base}/health`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

pub struct AskApiBackend {
    client: Client,
    base_url: String,
}

impl AskApiBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Readiness check against the service's health route
    pub async fn health(&self) -> Result<HealthStatus, BackendError> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::server(format!("Health check returned HTTP {status}")));
        }

        response
            .json::<HealthStatus>()
            .await
            .map_err(|e| BackendError::server(format!("Failed to parse health response: {e}")))
    }
}

#[async_trait]
impl AskBackend for AskApiBackend {
    async fn ask(&self, question: &str) -> Result<Answer, BackendError> {
        let response = self
            .client
            .post(self.url("/api/ask"))
            .json(&AskRequest { question })
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::transport(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(BackendError::server(format!("HTTP {status}: {body}")));
        }

        let parsed: AskResponse = serde_json::from_str(&body)
            .map_err(|e| BackendError::server(format!("Failed to parse response: {e} - body: {body}")))?;

        if let Some(query_type) = &parsed.query_type {
            tracing::debug!(query_type = %query_type, "Backend classified question");
        }

        Ok(Answer::new(parsed.answer))
    }

    fn name(&self) -> &str {
        "ask-api"
    }
}
