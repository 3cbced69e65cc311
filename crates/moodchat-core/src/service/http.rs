use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{ChatBackend, ChatRequest, ChatResponse};
use crate::error::ExchangeError;

/// JSON-over-HTTPS client for the chat endpoint.
///
/// No timeout is configured; a hung request waits on the transport default.
#[derive(Clone)]
pub struct HttpChatClient {
    client: Client,
    endpoint: String,
}

impl HttpChatClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }
}

#[async_trait]
impl ChatBackend for HttpChatClient {
    async fn send(&self, request: ChatRequest) -> Result<ChatResponse, ExchangeError> {
        // .json() sets Content-Type: application/json
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExchangeError::Status(status));
        }

        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "chat service replied");

        Ok(serde_json::from_str(&body)?)
    }
}
