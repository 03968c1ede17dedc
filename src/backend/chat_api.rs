//! `/chat` + `/upload` contract
//!
//! `POST {base}/chat` with `{"message": ...}` returns either
//! `{"response": ...}` or `{"error": ...}`. `POST {base}/upload` takes a
//! multipart `file` field and returns `{"error": ...}` or an acknowledgement.

use super::{Answer, AskBackend, BackendError, UploadDocument};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub struct ChatApiBackend {
    client: Client,
    base_url: String,
}

impl ChatApiBackend {
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

    /// Status and body text, plus the parsed reply when the body is one
    async fn read_reply(
        response: reqwest::Response,
    ) -> Result<(Option<ChatReply>, String), BackendError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::transport(format!("Failed to read response: {e}")))?;
        let parsed = serde_json::from_str::<ChatReply>(&body).ok();

        // A non-empty `{"error"}` field wins over the status code
        let error = parsed
            .as_ref()
            .and_then(|reply| reply.error.as_deref())
            .filter(|error| !error.is_empty());
        if let Some(error) = error {
            return Err(BackendError::server(format!("HTTP {status}: {error}"))
                .with_server_message(error));
        }
        if !status.is_success() {
            return Err(BackendError::server(format!("HTTP {status}: {body}")));
        }
        Ok((parsed, body))
    }
}

#[async_trait]
impl AskBackend for ChatApiBackend {
    async fn ask(&self, question: &str) -> Result<Answer, BackendError> {
        let response = self
            .client
            .post(self.url("/chat"))
            .json(&ChatRequest { message: question })
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(&e))?;

        match Self::read_reply(response).await? {
            (Some(ChatReply { response: Some(text), .. }), _) => Ok(Answer::new(text)),
            (Some(_), body) => Err(BackendError::server(format!(
                "Reply carried neither response nor error - body: {body}"
            ))),
            (None, body) => Err(BackendError::server(format!(
                "Failed to parse response - body: {body}"
            ))),
        }
    }

    async fn upload(&self, document: &UploadDocument) -> Result<(), BackendError> {
        let part = Part::bytes(document.bytes.clone())
            .file_name(document.file_name.clone())
            .mime_str(document.kind.mime_type())
            .map_err(|e| BackendError::transport(format!("Invalid upload part: {e}")))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(&e))?;

        // Any successful non-error body counts as an acknowledgement
        Self::read_reply(response).await.map(|_| ())
    }

    fn name(&self) -> &str {
        "chat-api"
    }
}
